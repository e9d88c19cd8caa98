#![cfg(feature = "rusqlite")]

use common::{birth_country, chain, chain_relation, leader, persons, ruled_country, sql};
use relq::prelude::*;

mod common;

/// Variant names reachable from a row, as `b`, `b/c`, `b/c/d`
fn variant_paths(view: RowView<'_>, prefix: &str, out: &mut Vec<String>) {
    for name in view.variant_names() {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };
        let variant = view.variant(name).unwrap();
        out.push(format!("{path}{}", if variant.is_empty() { " (empty)" } else { "" }));
        variant_paths(variant, &path, out);
    }
}

fn check_chain(query: SelectQuery, expected_sql: &str, expected_variants: &[&str]) {
    let db = chain();
    assert_eq!(sql(&db, &query), expected_sql);
    let row = db.fetch_one(&query).unwrap().unwrap();
    let mut paths = Vec::new();
    variant_paths(row.view(), "", &mut paths);
    assert_eq!(paths, expected_variants, "variants of {expected_sql}");
}

#[test]
fn joined_relations_expose_no_variant() {
    let b = || chain_relation("b", "a");
    let c = || chain_relation("c", "b");
    let d = || chain_relation("d", "c");

    check_chain(
        SelectQuery::table("a").join([b()]),
        r#"SELECT "a".* FROM "a" LEFT JOIN "b" ON "b"."aID" = "a"."id""#,
        &[],
    );
    check_chain(
        SelectQuery::table("a").join([b().join([c().join([d()])])]),
        concat!(
            r#"SELECT "a".* FROM "a" "#,
            r#"LEFT JOIN "b" ON "b"."aID" = "a"."id" "#,
            r#"LEFT JOIN "c" ON "c"."bID" = "b"."id" "#,
            r#"LEFT JOIN "d" ON "d"."cID" = "c"."id""#
        ),
        &[],
    );
}

#[test]
fn included_relations_expose_variants() {
    let b = || chain_relation("b", "a");
    let c = || chain_relation("c", "b");

    check_chain(
        SelectQuery::table("a").include([b()]),
        r#"SELECT "a".*, "b".* FROM "a" LEFT JOIN "b" ON "b"."aID" = "a"."id""#,
        &["b"],
    );
    check_chain(
        SelectQuery::table("a").include([b().join([c()])]),
        concat!(
            r#"SELECT "a".*, "b".* FROM "a" "#,
            r#"LEFT JOIN "b" ON "b"."aID" = "a"."id" "#,
            r#"LEFT JOIN "c" ON "c"."bID" = "b"."id""#
        ),
        &["b"],
    );
    check_chain(
        SelectQuery::table("a").include([b().include([c()])]),
        concat!(
            r#"SELECT "a".*, "b".*, "c".* FROM "a" "#,
            r#"LEFT JOIN "b" ON "b"."aID" = "a"."id" "#,
            r#"LEFT JOIN "c" ON "c"."bID" = "b"."id""#
        ),
        &["b", "b/c"],
    );
}

#[test]
fn nested_inclusions_bubble_up_through_joined_ancestors() {
    let b = || chain_relation("b", "a");
    let c = || chain_relation("c", "b");
    let d = || chain_relation("d", "c");

    check_chain(
        SelectQuery::table("a").join([b().include([c()])]),
        concat!(
            r#"SELECT "a".*, "c".* FROM "a" "#,
            r#"LEFT JOIN "b" ON "b"."aID" = "a"."id" "#,
            r#"LEFT JOIN "c" ON "c"."bID" = "b"."id""#
        ),
        &["b (empty)", "b/c"],
    );
    check_chain(
        SelectQuery::table("a").join([b().join([c().include([d()])])]),
        concat!(
            r#"SELECT "a".*, "d".* FROM "a" "#,
            r#"LEFT JOIN "b" ON "b"."aID" = "a"."id" "#,
            r#"LEFT JOIN "c" ON "c"."bID" = "b"."id" "#,
            r#"LEFT JOIN "d" ON "d"."cID" = "c"."id""#
        ),
        &["b (empty)", "b/c (empty)", "b/c/d"],
    );
    check_chain(
        SelectQuery::table("a").include([b().join([c().include([d()])])]),
        concat!(
            r#"SELECT "a".*, "b".*, "d".* FROM "a" "#,
            r#"LEFT JOIN "b" ON "b"."aID" = "a"."id" "#,
            r#"LEFT JOIN "c" ON "c"."bID" = "b"."id" "#,
            r#"LEFT JOIN "d" ON "d"."cID" = "c"."id""#
        ),
        &["b", "b/c (empty)", "b/c/d"],
    );
    check_chain(
        SelectQuery::table("a").join([b().include([c().include([d()])])]),
        concat!(
            r#"SELECT "a".*, "c".*, "d".* FROM "a" "#,
            r#"LEFT JOIN "b" ON "b"."aID" = "a"."id" "#,
            r#"LEFT JOIN "c" ON "c"."bID" = "b"."id" "#,
            r#"LEFT JOIN "d" ON "d"."cID" = "c"."id""#
        ),
        &["b (empty)", "b/c", "b/c/d"],
    );
}

#[test]
fn variant_columns_come_from_their_own_table() {
    let db = chain();
    let query = SelectQuery::table("a").include([chain_relation("b", "a")
        .include([chain_relation("c", "b")])]);
    let row = db.fetch_one(&query).unwrap().unwrap();
    assert_eq!(
        row.view().column_names().collect::<Vec<_>>(),
        ["id", "id", "aID", "id", "bID"]
    );
    let b = row.variant("b").unwrap();
    assert_eq!(b.column_names().collect::<Vec<_>>(), ["id", "aID"]);
    let c = b.variant("c").unwrap();
    assert_eq!(c.column_names().collect::<Vec<_>>(), ["id", "bID"]);
    assert_eq!(c.get_as::<i64>("bID").unwrap(), 1);
}

#[test]
fn derived_relation_alias() {
    let db = persons();
    let query = SelectQuery::table("persons")
        .include([birth_country()])
        .filter(literal("birthCountry.isoCode == 'FR'"));
    assert_eq!(
        sql(&db, &query),
        concat!(
            r#"SELECT "persons".*, "birthCountry".* FROM "persons" "#,
            r#"LEFT JOIN "countries" "birthCountry" ON "birthCountry"."isoCode" = "persons"."birthCountryIsoCode" "#,
            r#"WHERE birthCountry.isoCode == 'FR'"#
        )
    );
    let rows = db.fetch_all(&query).unwrap();
    assert_eq!(rows.len(), 2);
    let country = rows[0].variant("birthCountry").unwrap();
    assert_eq!(country.get_as::<String>("name").unwrap(), "France");
}

#[test]
fn explicit_relation_alias_keeps_logical_name() {
    let db = persons();
    let query = SelectQuery::table("persons")
        .include([birth_country().aliased("foo")])
        .filter(literal("foo.isoCode == 'US'"));
    assert_eq!(
        sql(&db, &query),
        concat!(
            r#"SELECT "persons".*, "foo".* FROM "persons" "#,
            r#"LEFT JOIN "countries" "foo" ON "foo"."isoCode" = "persons"."birthCountryIsoCode" "#,
            r#"WHERE foo.isoCode == 'US'"#
        )
    );
    let rows = db.fetch_all(&query).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_as::<String>("name").unwrap(), "John");
    assert!(rows[0].variant("foo").is_none());
    let country = rows[0].variant("birthCountry").unwrap();
    assert_eq!(country.get_as::<String>("name").unwrap(), "United States");
}

#[test]
fn attached_relations_are_found_by_name() {
    let db = persons();
    let query = SelectQuery::table("persons").join_required([birth_country()]);
    let country = query.relation("birthCountry").unwrap();
    let query = query
        .filter(country.column("name").eq("United States"));
    let query = query.clone().select([query.column("name")]);
    let rows = db.fetch_all(&query).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_as::<String>("name").unwrap(), "John");
}

#[test]
fn self_joins_are_numbered_in_traversal_order() {
    let db = persons();
    let query = SelectQuery::table("persons")
        .include([ruled_country().include([leader()])])
        .include([birth_country().include([leader().include([ruled_country()])])]);
    let query = query.clone().order([query.column("id")]);
    assert_eq!(
        sql(&db, &query),
        concat!(
            r#"SELECT "persons".*, "ruledCountry0".*, "leader0".*, "birthCountry".*, "leader1".*, "ruledCountry1".* "#,
            r#"FROM "persons" "#,
            r#"LEFT JOIN "countries" "ruledCountry0" ON "ruledCountry0"."leaderID" = "persons"."id" "#,
            r#"LEFT JOIN "persons" "leader0" ON "leader0"."id" = "ruledCountry0"."leaderID" "#,
            r#"LEFT JOIN "countries" "birthCountry" ON "birthCountry"."isoCode" = "persons"."birthCountryIsoCode" "#,
            r#"LEFT JOIN "persons" "leader1" ON "leader1"."id" = "birthCountry"."leaderID" "#,
            r#"LEFT JOIN "countries" "ruledCountry1" ON "ruledCountry1"."leaderID" = "leader1"."id" "#,
            r#"ORDER BY "persons"."id""#
        )
    );

    let rows = db.fetch_all(&query).unwrap();
    assert_eq!(rows.len(), 3);
    let name = |view: RowView<'_>| view.get_as::<Option<String>>("name").unwrap();

    let arthur = &rows[0];
    assert_eq!(arthur.get_as::<String>("name").unwrap(), "Arthur");
    assert!(arthur.variant("ruledCountry").unwrap().is_all_null());
    let birth = arthur.variant("birthCountry").unwrap();
    assert_eq!(name(birth).as_deref(), Some("France"));
    let birth_leader = birth.variant("leader").unwrap();
    assert_eq!(name(birth_leader).as_deref(), Some("Barbara"));
    assert_eq!(
        name(birth_leader.variant("ruledCountry").unwrap()).as_deref(),
        Some("France")
    );

    let john = &rows[2];
    let ruled = john.variant("ruledCountry").unwrap();
    assert_eq!(name(ruled).as_deref(), Some("United States"));
    assert_eq!(name(ruled.variant("leader").unwrap()).as_deref(), Some("John"));
}

#[test]
fn relation_filters_compose() {
    let db = persons();
    let ruled = ruled_country()
        .filter(|_, country| country.column("name").like("F%"))
        .filter(|_, country| country.column("isoCode").ne(Value::Null));
    let query = SelectQuery::table("persons").include_required([ruled]);
    assert_eq!(
        sql(&db, &query),
        concat!(
            r#"SELECT "persons".*, "ruledCountry".* FROM "persons" "#,
            r#"JOIN "countries" "ruledCountry" ON "ruledCountry"."leaderID" = "persons"."id" "#,
            r#"AND ("ruledCountry"."name" LIKE ?) AND ("ruledCountry"."isoCode" IS NOT NULL)"#
        )
    );
    let rows = db.fetch_all(&query).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_as::<String>("name").unwrap(), "Barbara");
}

#[test]
fn required_join_below_optional_join_is_rejected() {
    let db = persons();
    let query = SelectQuery::table("persons")
        .include([birth_country().include_required([leader()])]);
    let err = query.compile(db.conn()).unwrap_err();
    assert!(matches!(err, RelqError::RequiredAfterOptional { relation } if relation == "leader"));

    let query = SelectQuery::table("persons")
        .include_required([birth_country().include([leader()])]);
    assert!(query.compile(db.conn()).is_ok());
}

#[test]
fn missing_mapping_column_lists_candidates() {
    let db = persons();
    let broken = Relation::foreign_key("birthCountry", "countries", [("birthCountryIsoCode", "code")]);
    let err = SelectQuery::table("persons")
        .include([broken])
        .compile(db.conn())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "No such column \"code\" in table \"countries\". Valid column names are: isoCode, name, leaderID."
    );
}
