use proc_macro2::TokenStream;
use quote::quote;
use syn::WhereClause;

pub fn where_clause_with_bounds(
    where_clause: Option<&WhereClause>,
    bounds: &[TokenStream],
) -> TokenStream {
    if bounds.is_empty() {
        return where_clause
            .as_ref()
            .map_or_else(|| quote!(), |wc| quote!(#wc));
    }

    // predicates are re-punctuated so a trailing comma never doubles up
    let preds = where_clause.into_iter().flat_map(|wc| wc.predicates.iter());
    quote!(where #(#preds,)* #(#bounds),*)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn merged(where_clause: Option<&WhereClause>) -> WhereClause {
        let bounds = vec![quote!(T: Clone)];

        syn::parse2(where_clause_with_bounds(where_clause, &bounds)).unwrap()
    }

    #[test]
    fn trailing_comma_is_not_doubled() {
        let wc: WhereClause = parse_quote!(where T: Copy,);

        assert_eq!(merged(Some(&wc)).predicates.len(), 2);
    }

    #[test]
    fn bare_predicates_gain_a_separator() {
        let wc: WhereClause = parse_quote!(where T: Copy, T: Send);

        assert_eq!(merged(Some(&wc)).predicates.len(), 3);
    }

    #[test]
    fn missing_clause_is_created() {
        assert_eq!(merged(None).predicates.len(), 1);
    }

    #[test]
    fn no_bounds_keeps_the_clause_untouched() {
        let wc: WhereClause = parse_quote!(where T: Copy,);
        let tokens = where_clause_with_bounds(Some(&wc), &[]);

        assert_eq!(tokens.to_string(), quote!(#wc).to_string());
        assert!(where_clause_with_bounds(None, &[]).is_empty());
    }
}
