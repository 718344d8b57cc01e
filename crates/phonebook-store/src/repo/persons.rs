use crate::error::{Result, StoreError};
use phonebook_core::domain::{Person, PersonId, PersonNew};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::str::FromStr;

const INSERT_PERSON: &str = "INSERT INTO persons (id, name, email, phone, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5);";

/// Per-item result of a bulk insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchInsert {
    pub inserted: usize,
    pub rejected: usize,
}

pub struct PersonsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> PersonsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Phones in storage order.
    pub fn list_phones(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT phone FROM persons ORDER BY rowid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut phones = Vec::new();
        while let Some(row) = rows.next()? {
            phones.push(row.get(0)?);
        }
        Ok(phones)
    }

    pub fn find_by_phone(&self, phone: &str) -> Result<Option<Person>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, phone, created_at FROM persons WHERE phone = ?1;",
        )?;
        let person = stmt
            .query_row([phone], |row| Ok(person_from_row(row)))
            .optional()?;
        person.transpose()
    }

    pub fn count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(1) FROM persons;", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Stores one entry. The unique index on `phone` decides duplicates.
    pub fn insert_one(&self, now_utc: i64, person: &PersonNew) -> Result<Person> {
        let id = PersonId::new();
        self.conn
            .execute(
                INSERT_PERSON,
                params![
                    id.to_string(),
                    person.name,
                    person.email,
                    person.phone.as_str(),
                    now_utc
                ],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    StoreError::DuplicatePhone(person.phone.to_string())
                } else {
                    err.into()
                }
            })?;

        Ok(Person {
            id,
            name: person.name.clone(),
            email: person.email.clone(),
            phone: person.phone.to_string(),
            created_at: now_utc,
        })
    }

    /// Attempts every entry independently inside one transaction. Constraint
    /// violations only reject their own entry; any other failure rolls the
    /// whole batch back.
    pub fn insert_many(&self, now_utc: i64, people: &[PersonNew]) -> Result<BatchInsert> {
        let tx = self.conn.unchecked_transaction()?;
        let mut outcome = BatchInsert::default();
        {
            let mut stmt = tx.prepare(INSERT_PERSON)?;
            for person in people {
                let result = stmt.execute(params![
                    PersonId::new().to_string(),
                    person.name,
                    person.email,
                    person.phone.as_str(),
                    now_utc
                ]);
                match result {
                    Ok(_) => outcome.inserted += 1,
                    Err(err) if is_constraint_violation(&err) => outcome.rejected += 1,
                    Err(err) => return Err(err.into()),
                }
            }
        }
        tx.commit()?;
        Ok(outcome)
    }
}

fn person_from_row(row: &Row<'_>) -> Result<Person> {
    let id_str: String = row.get(0)?;
    let id = PersonId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    Ok(Person {
        id,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
