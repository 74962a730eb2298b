//! Google credential (token store) database operations

use chrono::Utc;
use rusqlite::{OptionalExtension, Result as SqliteResult};

use super::super::{Database, CREDENTIAL_ROW_ID};
use crate::integrations::google::TokenStore;
use crate::models::Credential;

impl Database {
    /// Get the stored credential, or None if the singleton row is missing
    pub fn get_google_credential(&self) -> SqliteResult<Option<Credential>> {
        let conn = self.conn();

        conn.query_row(
            "SELECT access_token, refresh_token, scope, token_type, expiry_date FROM google_tokens WHERE id = ?1",
            [CREDENTIAL_ROW_ID],
            |row| {
                Ok(Credential {
                    access_token: row.get(0)?,
                    refresh_token: row.get(1)?,
                    scope: row.get(2)?,
                    token_type: row.get(3)?,
                    expiry_date: row.get(4)?,
                })
            },
        )
        .optional()
    }

    /// Merge the present fields of `update` into the stored credential
    pub fn save_google_credential(&self, update: &Credential) -> SqliteResult<Credential> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();

        let rows_affected = conn.execute(
            "UPDATE google_tokens SET
                access_token = COALESCE(?1, access_token),
                refresh_token = COALESCE(?2, refresh_token),
                scope = COALESCE(?3, scope),
                token_type = COALESCE(?4, token_type),
                expiry_date = COALESCE(?5, expiry_date),
                updated_at = ?6
             WHERE id = ?7",
            rusqlite::params![
                update.access_token,
                update.refresh_token,
                update.scope,
                update.token_type,
                update.expiry_date,
                &now,
                CREDENTIAL_ROW_ID,
            ],
        )?;

        if rows_affected == 0 {
            return Err(rusqlite::Error::QueryReturnedNoRows);
        }

        drop(conn);

        self.get_google_credential()?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)
    }
}

impl TokenStore for Database {
    fn load(&self) -> SqliteResult<Option<Credential>> {
        self.get_google_credential()
    }

    fn save(&self, update: &Credential) -> SqliteResult<Credential> {
        self.save_google_credential(update)
    }
}
