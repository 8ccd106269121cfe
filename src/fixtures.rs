//! Record types shared by the unit tests

use rusqlite::Row;

use crate::record::{Column, Field, Record};
use crate::storage::Registry;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub age: Option<i64>,
}

impl Person {
    pub const ID: Field<Person> = Field::id();
    pub const NAME: Field<Person> = Field::new("name");
    pub const EMAIL: Field<Person> = Field::new("email");
    pub const AGE: Field<Person> = Field::new("age");

    pub fn new(name: &str, email: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
            age: None,
        }
    }

    pub fn aged(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }
}

impl Record for Person {
    const TABLE: &'static str = "person";
    const COLUMNS: &'static [Column] = &[
        Column::text("name"),
        Column::text("email").unique(),
        Column::integer("age").nullable(),
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::from(&self.name),
            Value::from(&self.email),
            Value::from(self.age),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            email: row.get(2)?,
            age: row.get(3)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pet {
    pub id: Option<i64>,
    pub name: String,
    pub vaccinated: bool,
}

impl Pet {
    pub const NAME: Field<Pet> = Field::new("name");

    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            vaccinated: false,
        }
    }
}

impl Record for Pet {
    const TABLE: &'static str = "pet";
    const COLUMNS: &'static [Column] = &[Column::text("name"), Column::boolean("vaccinated")];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn to_values(&self) -> Vec<Value> {
        vec![Value::from(&self.name), Value::from(self.vaccinated)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            vaccinated: row.get(2)?,
        })
    }
}

/// Registry with both fixture record types
pub fn registry() -> Registry {
    Registry::new().register::<Person>().register::<Pet>()
}
