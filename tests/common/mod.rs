#![allow(dead_code)]

use relq::prelude::*;

/// `owner(id, name)` and `owned(id, ownerId, name)`: Arthur owns nothing,
/// Barbara owns a towel.
pub fn owners() -> Database {
    let db = Database::open_in_memory().expect("open database");
    db.execute_batch(
        "CREATE TABLE owner (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         CREATE TABLE owned (id INTEGER PRIMARY KEY, ownerId INTEGER REFERENCES owner(id), name TEXT NOT NULL);
         INSERT INTO owner (id, name) VALUES (1, 'Arthur'), (2, 'Barbara');
         INSERT INTO owned (id, ownerId, name) VALUES (1, 2, 'Towel');",
    )
    .expect("seed owners");
    db
}

pub fn owned_relation() -> Relation {
    Relation::foreign_key("owned", "owned", [("id", "ownerId")])
}

/// Chain `a <- b <- c <- d`, one row each.
pub fn chain() -> Database {
    let db = Database::open_in_memory().expect("open database");
    db.execute_batch(
        "CREATE TABLE a (id INTEGER PRIMARY KEY);
         CREATE TABLE b (id INTEGER PRIMARY KEY, aID REFERENCES a(id));
         CREATE TABLE c (id INTEGER PRIMARY KEY, bID REFERENCES b(id));
         CREATE TABLE d (id INTEGER PRIMARY KEY, cID REFERENCES c(id));
         INSERT INTO a (id) VALUES (1);
         INSERT INTO b (id, aID) VALUES (1, 1);
         INSERT INTO c (id, bID) VALUES (1, 1);
         INSERT INTO d (id, cID) VALUES (1, 1);",
    )
    .expect("seed chain");
    db
}

pub fn chain_relation(name: &str, parent: &str) -> Relation {
    let column = format!("{parent}ID");
    Relation::foreign_key(name, name, [("id", column)])
}

/// Persons born in and ruling countries; every country has a leader.
pub fn persons() -> Database {
    let db = Database::open_in_memory().expect("open database");
    db.execute_batch(
        "CREATE TABLE persons (id INTEGER PRIMARY KEY, name TEXT NOT NULL, birthCountryIsoCode TEXT NOT NULL);
         CREATE TABLE countries (isoCode TEXT NOT NULL PRIMARY KEY, name TEXT NOT NULL, leaderID INTEGER);
         INSERT INTO persons (id, name, birthCountryIsoCode) VALUES (1, 'Arthur', 'FR'), (2, 'Barbara', 'FR'), (3, 'John', 'US');
         INSERT INTO countries (isoCode, name, leaderID) VALUES ('FR', 'France', 2), ('US', 'United States', 3);",
    )
    .expect("seed persons");
    db
}

pub fn birth_country() -> Relation {
    Relation::foreign_key("birthCountry", "countries", [("birthCountryIsoCode", "isoCode")])
}

pub fn ruled_country() -> Relation {
    Relation::foreign_key("ruledCountry", "countries", [("id", "leaderID")])
}

pub fn leader() -> Relation {
    Relation::foreign_key("leader", "persons", [("leaderID", "id")])
}

pub fn sql(db: &Database, query: &SelectQuery) -> String {
    query.compile(db.conn()).expect("compile").sql
}
