#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Query builder tests.
//!
//! Parse list parameters once and check that the relational and search
//! paths agree on filtering, ordering and paging.

use serde_json::json;

use storefront_kernel::query::{
    CATEGORY, ListParams, PRODUCT, PaginatedResult, QueryBuilder, RelationalQueryBuilder,
    SearchQueryBuilder,
};

fn params(search: Option<&str>, order_by: Option<&str>, page: &str, page_size: &str) -> ListParams {
    ListParams {
        select: Some(r#"["id","title","price"]"#.to_string()),
        search: search.map(str::to_string),
        order_by: order_by.map(str::to_string),
        page: Some(page.to_string()),
        page_size: Some(page_size.to_string()),
    }
}

#[test]
fn second_page_of_fifty() {
    let descriptor = PRODUCT.parse_list(&params(None, None, "2", "20")).unwrap();

    let sql = RelationalQueryBuilder::new(&PRODUCT).build(&descriptor).unwrap();
    assert!(sql.data.ends_with("LIMIT 20 OFFSET 20"), "{}", sql.data);

    let request = SearchQueryBuilder::new(&PRODUCT).build(&descriptor).unwrap();
    assert_eq!(request.from, 20);
    assert_eq!(request.size, 20);

    let rows: Vec<u32> = (21..=40).collect();
    let envelope = PaginatedResult::assemble(rows, 50, descriptor.page, descriptor.page_size);
    assert_eq!(envelope.page, 2);
    assert_eq!(envelope.page_size, 20);
    assert_eq!(envelope.total_pages, 3);
    assert_eq!(envelope.data.len(), 20);
}

#[test]
fn category_name_search() {
    let descriptor = CATEGORY
        .parse_list(&ListParams {
            select: Some(r#"["id","name"]"#.to_string()),
            search: Some(r#"[{"column":"name","operation":"like","value":"beauty"}]"#.to_string()),
            ..Default::default()
        })
        .unwrap();

    let sql = RelationalQueryBuilder::new(&CATEGORY).build(&descriptor).unwrap();
    assert!(
        sql.data
            .contains(r#"WHERE "category"."name" ILIKE '%beauty%'"#),
        "{}",
        sql.data
    );
    assert!(sql.count.contains("ILIKE '%beauty%'"));
    assert!(!sql.count.contains("LIMIT"));
}

#[test]
fn substring_matching_is_case_insensitive_in_both_paths() {
    let descriptor = PRODUCT
        .parse_list(&params(
            Some(r#"[{"column":"title","value":"PHONE"}]"#),
            None,
            "1",
            "10",
        ))
        .unwrap();

    let sql = RelationalQueryBuilder::new(&PRODUCT).build(&descriptor).unwrap();
    assert!(sql.data.contains(r#""product"."title" ILIKE '%PHONE%'"#));

    let request = SearchQueryBuilder::new(&PRODUCT).build(&descriptor).unwrap();
    let body = serde_json::to_value(request).unwrap();
    assert_eq!(
        body["query"]["bool"]["must"][0]["wildcard"]["title"],
        json!({"value": "*PHONE*", "case_insensitive": true})
    );
}

#[test]
fn sort_order_preserved_in_both_paths() {
    let descriptor = PRODUCT
        .parse_list(&params(
            None,
            Some(r#"[{"column":"price","direction":"desc"},{"column":"title","direction":"asc"}]"#),
            "1",
            "10",
        ))
        .unwrap();

    let sql = RelationalQueryBuilder::new(&PRODUCT).build(&descriptor).unwrap();
    assert!(sql
        .data
        .contains(r#"ORDER BY "product"."price" DESC, "product"."title" ASC"#));

    let request = SearchQueryBuilder::new(&PRODUCT).build(&descriptor).unwrap();
    assert_eq!(
        serde_json::to_value(&request.sort).unwrap(),
        json!([{"price": "desc"}, {"title": "asc"}])
    );
}

#[test]
fn range_filters_in_both_paths() {
    let descriptor = PRODUCT
        .parse_list(&params(
            Some(
                r#"[{"column":"price","operation":">","value":100},{"column":"price","operation":"<=","value":1000}]"#,
            ),
            None,
            "1",
            "10",
        ))
        .unwrap();

    let sql = RelationalQueryBuilder::new(&PRODUCT).build(&descriptor).unwrap();
    assert!(sql
        .data
        .contains(r#""product"."price" > 100 AND "product"."price" <= 1000"#));

    let request = SearchQueryBuilder::new(&PRODUCT).build(&descriptor).unwrap();
    let body = serde_json::to_value(request).unwrap();
    assert_eq!(
        body["query"]["bool"]["must"],
        json!([{"range": {"price": {"gt": 100, "lte": 1000}}}])
    );
}

#[test]
fn building_is_idempotent() {
    let descriptor = PRODUCT
        .parse_list(&params(
            Some(r#"[{"column":"tags","value":"beauty"},{"column":"rating","operation":">=","value":4.5}]"#),
            Some(r#"[{"column":"rating","direction":"desc"}]"#),
            "3",
            "7",
        ))
        .unwrap();

    let relational = RelationalQueryBuilder::new(&PRODUCT);
    assert_eq!(
        relational.build(&descriptor).unwrap(),
        relational.build(&descriptor).unwrap()
    );

    let search = SearchQueryBuilder::new(&PRODUCT);
    assert_eq!(
        search.build(&descriptor).unwrap(),
        search.build(&descriptor).unwrap()
    );
}
