use relq_core::RowAdapter;
use relq_core::prelude::*;

fn schema() -> StaticSchema {
    StaticSchema::new()
        .table("a", ["id"])
        .table("a0", ["id"])
        .table("b", ["id", "aID"])
        .table("c", ["id", "bID"])
        .table("persons", ["id", "name", "leaderId"])
        .table("owner", ["id", "name"])
        .table("owned", ["id", "ownerId", "name"])
}

fn link(name: &str, parent: &str) -> Relation {
    Relation::foreign_key(name, name, [("id", format!("{parent}ID"))])
}

fn leader() -> Relation {
    Relation::foreign_key("leader", "persons", [("leaderId", "id")])
}

fn sql(query: &SelectQuery) -> String {
    query.compile(&schema()).unwrap().sql
}

#[test]
fn required_relations_must_not_follow_optional_ones() {
    let query = SelectQuery::table("a").include([link("b", "a").include_required([link("c", "b")])]);
    let err = query.compile(&schema()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid required relation `c` after a non-required relation"
    );

    let query = SelectQuery::table("a").join_required([link("b", "a").include([link("c", "b")])]);
    assert_eq!(
        sql(&query),
        concat!(
            r#"SELECT "a".*, "c".* FROM "a" "#,
            r#"JOIN "b" ON "b"."aID" = "a"."id" "#,
            r#"LEFT JOIN "c" ON "c"."bID" = "b"."id""#
        )
    );
}

#[test]
fn explicit_aliases_must_be_unique() {
    let query = SelectQuery::table("persons")
        .aliased("p")
        .include([leader().aliased("p")]);
    assert!(matches!(
        query.compile(&schema()),
        Err(RelqError::DuplicateAlias(alias)) if alias == "p"
    ));
}

#[test]
fn explicit_alias_wins_over_generated_names() {
    let query = SelectQuery::table("persons").include([leader().aliased("persons")]);
    assert_eq!(
        sql(&query),
        concat!(
            r#"SELECT "persons0".*, "persons".* FROM "persons" "persons0" "#,
            r#"LEFT JOIN "persons" ON "persons"."id" = "persons0"."leaderId""#
        )
    );
}

#[test]
fn generated_names_skip_taken_suffixes() {
    let same_id = || Relation::foreign_key("a", "a", [("id", "id")]);
    let query = SelectQuery::table("a0").join([same_id(), same_id()]);
    assert_eq!(
        sql(&query),
        concat!(
            r#"SELECT "a0".* FROM "a0" "#,
            r#"LEFT JOIN "a" "a1" ON "a1"."id" = "a0"."id" "#,
            r#"LEFT JOIN "a" "a2" ON "a2"."id" = "a0"."id""#
        )
    );
}

#[test]
fn compiling_twice_resolves_the_same_names() {
    let query = SelectQuery::table("persons")
        .include([leader().include([leader()])])
        .join([leader()]);
    let first = query.compile(&schema()).unwrap();
    assert_eq!(query.compile(&schema()).unwrap(), first);
    assert_eq!(
        first.sql,
        concat!(
            r#"SELECT "persons".*, "leader0".*, "leader1".* FROM "persons" "#,
            r#"LEFT JOIN "persons" "leader0" ON "leader0"."id" = "persons"."leaderId" "#,
            r#"LEFT JOIN "persons" "leader1" ON "leader1"."id" = "leader0"."leaderId" "#,
            r#"LEFT JOIN "persons" "leader2" ON "leader2"."id" = "persons"."leaderId""#
        )
    );
}

#[test]
fn unknown_mapping_column_names_the_table() {
    let broken = Relation::foreign_key("owned", "owned", [("id", "ownerID_")]);
    let err = SelectQuery::table("owner")
        .include([broken])
        .compile(&schema())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "No such column \"ownerID_\" in table \"owned\". Valid column names are: id, ownerId, name."
    );
}

#[test]
fn cross_join_has_no_condition() {
    let every_owned = Relation::new("owned", "owned", |owner, owned| {
        owned.column("ownerId").eq(owner.column("id"))
    });
    let query = SelectQuery::table("owner").attach(JoinKind::Cross, false, [every_owned]);
    assert_eq!(
        sql(&query),
        r#"SELECT "owner".* FROM "owner" CROSS JOIN "owned""#
    );
}

#[test]
fn relation_filters_are_associative() {
    let by_name = |_: SourceRef, owned: SourceRef| owned.column("name").eq("Towel");
    let by_id = |_: SourceRef, owned: SourceRef| owned.column("id").gt(0);

    let chained = Relation::foreign_key("owned", "owned", [("id", "ownerId")])
        .filter(by_name)
        .filter(by_id);
    let combined = Relation::foreign_key("owned", "owned", [("id", "ownerId")])
        .filter(move |owner, owned| by_name(owner, owned) & by_id(owner, owned));

    let chained = SelectQuery::table("owner").include([chained]);
    let combined = SelectQuery::table("owner").include([combined]);
    assert_eq!(sql(&chained), sql(&combined));
    assert_eq!(
        sql(&chained),
        concat!(
            r#"SELECT "owner".*, "owned".* FROM "owner" LEFT JOIN "owned" "#,
            r#"ON "owned"."ownerId" = "owner"."id" AND ("owned"."name" = ?) AND ("owned"."id" > ?)"#
        )
    );
}

#[test]
fn subquery_relation() {
    let named = SelectQuery::table("owned").filter(col("name").ne(Value::Null));
    let recent = Relation::subquery("recent", named, |owner, recent| {
        recent.column("ownerId").eq(owner.column("id"))
    });
    let query = SelectQuery::table("owner").include([recent]);
    let compiled = query.compile(&schema()).unwrap();
    assert_eq!(
        compiled.sql,
        concat!(
            r#"SELECT "owner".*, "recent".* FROM "owner" "#,
            r#"LEFT JOIN (SELECT * FROM "owned" WHERE ("name" IS NOT NULL)) AS "recent" "#,
            r#"ON ("recent"."ownerId" = "owner"."id")"#
        )
    );
    assert!(compiled.arguments.is_empty());
    assert_eq!(query.number_of_columns(&schema()).unwrap(), 5);
}

#[test]
fn reused_relation_gets_fresh_sources() {
    let owned = Relation::foreign_key("owned", "owned", [("id", "ownerId")]);
    let first = SelectQuery::table("owner").include([owned.clone()]);
    let second = SelectQuery::table("owner").include([owned]);
    assert_ne!(first.relation("owned"), second.relation("owned"));
    assert_eq!(sql(&first), sql(&second));
}

#[test]
fn joined_parent_carries_included_children() {
    let query = SelectQuery::table("a").join([link("b", "a").include([link("c", "b")])]);
    let expected = RowAdapter::all().with_variant(
        "b",
        RowAdapter::empty().with_variant("c", RowAdapter::range(1..3)),
    );
    assert_eq!(query.row_adapter(&schema()).unwrap(), expected);

    let query = SelectQuery::table("a").join([link("b", "a").join([link("c", "b")])]);
    assert_eq!(query.row_adapter(&schema()).unwrap(), RowAdapter::all());
}
