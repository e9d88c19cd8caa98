#![cfg(feature = "rusqlite")]

use common::{owned_relation, owners, sql};
use relq::prelude::*;

mod common;

fn names(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .map(|row| row.get_as::<String>("name").unwrap())
        .collect()
}

#[test]
fn null_comparisons_match_rows() {
    let db = Database::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE player (id INTEGER PRIMARY KEY, name TEXT, team TEXT);
         INSERT INTO player (name, team) VALUES ('Ann', 'red'), ('Bob', NULL), ('Cid', 'blue');",
    )
    .unwrap();

    let query = SelectQuery::table("player").filter(col("team").eq(None::<&str>));
    assert_eq!(
        sql(&db, &query),
        r#"SELECT * FROM "player" WHERE ("team" IS NULL)"#
    );
    assert_eq!(names(&db.fetch_all(&query).unwrap()), ["Bob"]);

    let query = SelectQuery::table("player")
        .filter(col("team").ne(Value::Null))
        .order([col("name").desc()]);
    assert_eq!(names(&db.fetch_all(&query).unwrap()), ["Cid", "Ann"]);

    let query = SelectQuery::table("player").filter(!col("team").eq(Value::Null));
    assert_eq!(db.fetch_count(&query).unwrap(), 2);
}

#[test]
fn empty_lists_select_nothing_or_everything() {
    let db = owners();
    let none = SelectQuery::table("owner").filter(col("id").in_list(Vec::<i64>::new()));
    assert_eq!(sql(&db, &none), r#"SELECT * FROM "owner" WHERE 0"#);
    assert!(db.fetch_all(&none).unwrap().is_empty());

    let all = SelectQuery::table("owner").filter(col("id").not_in_list(Vec::<i64>::new()));
    assert_eq!(db.fetch_all(&all).unwrap().len(), 2);

    let any = SelectQuery::table("owner").filter(or(Vec::<Expression>::new()));
    assert!(db.fetch_all(&any).unwrap().is_empty());
}

#[test]
fn correlated_exists_refers_to_the_outer_source() {
    let db = owners();
    let owner = SelectQuery::table("owner");
    let root = owner.root().unwrap();
    let owned = SelectQuery::table("owned");
    let owned_root = owned.root().unwrap();
    let has_items = owned
        .filter(owned_root.column("ownerId").eq(root.column("id")))
        .exists();
    let query = owner.filter(has_items);
    assert_eq!(
        sql(&db, &query),
        concat!(
            r#"SELECT * FROM "owner" WHERE (EXISTS (SELECT * FROM "owned" "#,
            r#"WHERE ("owned"."ownerId" = "owner"."id")))"#
        )
    );
    assert_eq!(names(&db.fetch_all(&query).unwrap()), ["Barbara"]);
}

#[test]
fn correlated_exists_over_the_same_table() {
    let db = Database::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE staff (id INTEGER PRIMARY KEY, name TEXT, managerId INTEGER);
         INSERT INTO staff (id, name, managerId) VALUES (1, 'boss', NULL), (2, 'clerk', 1);",
    )
    .unwrap();
    let managers = SelectQuery::table("staff");
    let manager = managers.root().unwrap();
    let reports = SelectQuery::table("staff");
    let manager_id = reports.column("managerId");
    let reports = reports.filter(manager_id.eq(manager.column("id")));
    let query = managers.filter(reports.exists());
    assert_eq!(
        sql(&db, &query),
        concat!(
            r#"SELECT * FROM "staff" WHERE (EXISTS (SELECT * FROM "staff" "staff0" "#,
            r#"WHERE ("staff0"."managerId" = "staff"."id")))"#
        )
    );
    assert_eq!(names(&db.fetch_all(&query).unwrap()), ["boss"]);
}

#[test]
fn double_negation_stays_an_expression() {
    let db = owners();
    let query = SelectQuery::table("owner")
        .filter(col("id").neg().neg().gt(1))
        .filter(col("name").eq("Barbara"));
    assert_eq!(
        sql(&db, &query),
        r#"SELECT * FROM "owner" WHERE ((- -"id" > ?) AND ("name" = ?))"#
    );
    assert_eq!(names(&db.fetch_all(&query).unwrap()), ["Barbara"]);
}

#[test]
fn membership_in_a_subquery() {
    let db = owners();
    let owner_ids = SelectQuery::table("owned").select([col("ownerId")]);
    let query = SelectQuery::table("owner").filter(!owner_ids.contains(col("id")));
    assert_eq!(names(&db.fetch_all(&query).unwrap()), ["Arthur"]);
}

#[test]
fn literal_sql_binds_its_arguments() {
    let db = owners();
    let query = SelectQuery::table("owner")
        .filter_sql("name = :name", Arguments::named([("name", "Arthur")]))
        .filter(col("id").between(1, 2));
    let compiled = query.compile(db.conn()).unwrap();
    assert_eq!(
        compiled.sql,
        r#"SELECT * FROM "owner" WHERE (name = :name AND ("id" BETWEEN ? AND ?))"#
    );
    assert_eq!(compiled.arguments.values(), [Value::Integer(1), Value::Integer(2)]);
    assert_eq!(names(&db.fetch_all(&query).unwrap()), ["Arthur"]);
}

#[test]
fn aggregates_over_a_relation() {
    let db = owners();
    let query = SelectQuery::table("owner").join([owned_relation()]);
    let owned = query.relation("owned").unwrap();
    let query = query
        .clone()
        .select([
            Selectable::from(query.column("name")),
            count(owned.column("id")).aliased("items"),
        ])
        .group_by([query.column("id")])
        .having(count(owned.column("id")).gt(0));
    let rows = db.fetch_all(&query).unwrap();
    assert_eq!(names(&rows), ["Barbara"]);
    assert_eq!(rows[0].get_as::<i64>("items").unwrap(), 1);
}
