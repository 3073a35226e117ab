//! Entity adapter
//!
//! Composes record-store calls into domain users and translates between
//! the public token and the internal surrogate key. Every entry point that
//! accepts an external identifier parses it before touching storage, so a
//! malformed token never reaches the store.

use crate::dto::{EmailAddress, User, UserContact, UserName};
use roster_core_types::UserToken;
use roster_errors::{mapping_error, validation_error, Result};
use roster_store::records::Name;
use roster_store::users::UserStore;

/// Domain-level operations over one record store
pub struct UserAdapter<S: UserStore> {
    store: S,
}

impl<S: UserStore> UserAdapter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Allocate a new user, returning its public identifier
    pub async fn create(&self) -> Result<String> {
        let guid = self.store.create().await?;
        Ok(UserToken::from_uuid(guid).to_string())
    }

    /// Fetch the composite user for an identifier; `None` when unknown
    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        let token = parse_token(id)?;

        let Some(item) = self.store.fetch(token.as_uuid()).await? else {
            return Ok(None);
        };
        let item_id = require_key(item.id)?;
        if item.guid.is_none() {
            return Err(mapping_error("item.guid"));
        }

        let name = self.assemble_name(item_id).await?;
        let contact = self.assemble_contact(item_id).await?;
        Ok(Some(User {
            id: token.to_string(),
            name,
            contact,
        }))
    }

    /// Apply a partial update; `false` when the user is unknown
    ///
    /// A version conflict from the store propagates unchanged so the
    /// boundary can report it; this adapter never retries.
    pub async fn set(&self, user: User) -> Result<bool> {
        let token = parse_token(&user.id)?;

        let Some(item) = self.store.fetch(token.as_uuid()).await? else {
            return Ok(false);
        };
        let item_id = require_key(item.id)?;

        if let Some(name) = user.name {
            let record = Name {
                item_id: Some(item_id),
                version: None,
                first: name.first,
                middle: name.middle,
                last: name.last,
                display: name.display,
            };
            self.store.upsert_name(record).await?;
        }
        Ok(true)
    }

    /// Delete a user; `false` when the identifier matched nothing
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let token = parse_token(id)?;
        let rows = self.store.delete(token.as_uuid()).await?;
        Ok(rows > 0)
    }

    /// One page of composite users, anchored on an optional cursor token
    pub async fn list(&self, start_id: Option<&str>, limit: i64) -> Result<Vec<User>> {
        let cursor = match start_id {
            Some(raw) => Some(parse_token(raw)?),
            None => None,
        };

        let entries = self
            .store
            .list(cursor.map(|token| token.as_uuid()), limit)
            .await?;
        let mut users = Vec::with_capacity(entries.len());
        for entry in entries {
            let item_id = entry.id.ok_or_else(|| mapping_error("list.id"))?;
            let guid = entry.guid.ok_or_else(|| mapping_error("list.guid"))?;

            let name = self.assemble_name(item_id).await?;
            let contact = self.assemble_contact(item_id).await?;
            users.push(User {
                id: UserToken::from_uuid(guid).to_string(),
                name,
                contact,
            });
        }
        Ok(users)
    }

    /// Engine-reported estimate of the user count
    pub async fn total_count(&self) -> Result<i64> {
        self.store.approximate_count().await
    }

    async fn assemble_name(&self, item_id: i64) -> Result<Option<UserName>> {
        let Some(record) = self.store.fetch_name(item_id).await? else {
            return Ok(None);
        };
        let name = UserName {
            first: record.first,
            middle: record.middle,
            last: record.last,
            display: record.display,
        };
        Ok((!name.is_empty()).then_some(name))
    }

    async fn assemble_contact(&self, item_id: i64) -> Result<Option<UserContact>> {
        let records = self.store.list_emails(item_id).await?;
        let emails: Vec<EmailAddress> = records
            .into_iter()
            .map(|record| EmailAddress {
                address: record.address,
                description: record.description,
                verified: record.verified,
            })
            .filter(|email| !email.is_empty())
            .collect();
        Ok((!emails.is_empty()).then(|| UserContact { emails }))
    }
}

fn parse_token(raw: &str) -> Result<UserToken> {
    raw.parse()
        .map_err(|_| validation_error("id", "not a well-formed token"))
}

fn require_key(id: Option<i64>) -> Result<i64> {
    match id {
        Some(id) if id >= 1 => Ok(id),
        _ => Err(mapping_error("item.id")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::eq;
    use roster_store::records::{Email, Item, ListEntry};
    use uuid::Uuid;

    mock! {
        pub Store {}

        #[async_trait::async_trait]
        impl UserStore for Store {
            async fn create(&self) -> Result<Uuid>;
            async fn fetch(&self, guid: Uuid) -> Result<Option<Item>>;
            async fn delete(&self, guid: Uuid) -> Result<u64>;
            async fn fetch_name(&self, item_id: i64) -> Result<Option<Name>>;
            async fn upsert_name(&self, name: Name) -> Result<()>;
            async fn list(&self, after: Option<Uuid>, limit: i64) -> Result<Vec<ListEntry>>;
            async fn list_emails(&self, item_id: i64) -> Result<Vec<Email>>;
            async fn approximate_count(&self) -> Result<i64>;
        }
    }

    fn adapter(store: MockStore) -> UserAdapter<MockStore> {
        UserAdapter::new(store)
    }

    fn item(id: i64, guid: Uuid) -> Item {
        Item {
            id: Some(id),
            guid: Some(guid),
        }
    }

    #[tokio::test]
    async fn test_malformed_token_fails_without_storage_access() {
        // No expectations are set: any store call would panic the test.
        let adapter = adapter(MockStore::new());

        let err = adapter.get("not-a-token").await.unwrap_err();
        assert_eq!(err.code(), "ERR_VALIDATION");

        let err = adapter.delete("").await.unwrap_err();
        assert_eq!(err.code(), "ERR_VALIDATION");

        let err = adapter.list(Some("nope"), 10).await.unwrap_err();
        assert_eq!(err.code(), "ERR_VALIDATION");

        let user = User {
            id: "broken".to_string(),
            name: None,
            contact: None,
        };
        let err = adapter.set(user).await.unwrap_err();
        assert_eq!(err.code(), "ERR_VALIDATION");
    }

    #[tokio::test]
    async fn test_get_unknown_token_is_absent() {
        let guid = Uuid::new_v4();
        let mut store = MockStore::new();
        store
            .expect_fetch()
            .with(eq(guid))
            .returning(|_| Ok(None));

        let found = adapter(store).get(&guid.to_string()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_assembles_the_composite() {
        let guid = Uuid::new_v4();
        let mut store = MockStore::new();
        store
            .expect_fetch()
            .with(eq(guid))
            .returning(move |_| Ok(Some(item(7, guid))));
        store.expect_fetch_name().with(eq(7)).returning(|_| {
            Ok(Some(Name {
                item_id: Some(7),
                version: Some(3),
                first: Some("Test".to_string()),
                display: Some("Test User".to_string()),
                ..Name::default()
            }))
        });
        store.expect_list_emails().with(eq(7)).returning(|_| {
            Ok(vec![Email {
                id: Some(1),
                item_id: Some(7),
                address: Some("test@example.com".to_string()),
                ..Email::default()
            }])
        });

        let user = adapter(store)
            .get(&guid.to_string())
            .await
            .unwrap()
            .expect("user should assemble");
        assert_eq!(user.id, guid.to_string());
        let name = user.name.expect("name should be present");
        assert_eq!(name.first.as_deref(), Some("Test"));
        assert_eq!(name.display.as_deref(), Some("Test User"));
        assert!(name.middle.is_none() && name.last.is_none());
        let contact = user.contact.expect("contact should be present");
        assert_eq!(
            contact.emails[0].address.as_deref(),
            Some("test@example.com")
        );
    }

    #[tokio::test]
    async fn test_all_absent_sub_objects_collapse() {
        let guid = Uuid::new_v4();
        let mut store = MockStore::new();
        store
            .expect_fetch()
            .returning(move |_| Ok(Some(item(9, guid))));
        store.expect_fetch_name().returning(|_| {
            Ok(Some(Name {
                item_id: Some(9),
                version: Some(1),
                ..Name::default()
            }))
        });
        store.expect_list_emails().returning(|_| {
            Ok(vec![Email {
                id: Some(4),
                version: Some(1),
                item_id: Some(9),
                ..Email::default()
            }])
        });

        let user = adapter(store)
            .get(&guid.to_string())
            .await
            .unwrap()
            .unwrap();
        assert!(user.name.is_none(), "all-absent name must collapse");
        assert!(user.contact.is_none(), "all-absent contact must collapse");
    }

    #[tokio::test]
    async fn test_set_propagates_conflicts_unchanged() {
        let guid = Uuid::new_v4();
        let mut store = MockStore::new();
        store
            .expect_fetch()
            .returning(move |_| Ok(Some(item(5, guid))));
        store
            .expect_upsert_name()
            .withf(|name| name.item_id == Some(5) && name.first.as_deref() == Some("Ada"))
            .returning(|_| {
                Err(roster_errors::conflict_error(
                    "name",
                    "version guard matched no rows",
                ))
            });

        let user = User {
            id: guid.to_string(),
            name: Some(UserName {
                first: Some("Ada".to_string()),
                ..UserName::default()
            }),
            contact: None,
        };
        let err = adapter(store).set(user).await.unwrap_err();
        assert_eq!(err.code(), "ERR_CONFLICT");
    }

    #[tokio::test]
    async fn test_set_unknown_token_reports_not_found() {
        let mut store = MockStore::new();
        store.expect_fetch().returning(|_| Ok(None));

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: Some(UserName::default()),
            contact: None,
        };
        assert!(!adapter(store).set(user).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_without_payload_touches_nothing() {
        let guid = Uuid::new_v4();
        let mut store = MockStore::new();
        store
            .expect_fetch()
            .returning(move |_| Ok(Some(item(5, guid))));
        // No upsert expectation: a call would panic.

        let user = User {
            id: guid.to_string(),
            name: None,
            contact: None,
        };
        assert!(adapter(store).set(user).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_maps_row_counts_to_booleans() {
        let guid = Uuid::new_v4();
        let mut store = MockStore::new();
        store.expect_delete().with(eq(guid)).returning(|_| Ok(1));
        assert!(adapter(store).delete(&guid.to_string()).await.unwrap());

        let mut store = MockStore::new();
        store.expect_delete().returning(|_| Ok(0));
        assert!(!adapter(store).delete(&guid.to_string()).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_preserves_storage_order_and_limit() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut store = MockStore::new();
        store
            .expect_list()
            .with(eq(None::<Uuid>), eq(500))
            .returning(move |_, _| {
                Ok(vec![
                    ListEntry {
                        id: Some(1),
                        guid: Some(first),
                        display: None,
                    },
                    ListEntry {
                        id: Some(2),
                        guid: Some(second),
                        display: None,
                    },
                ])
            });
        store.expect_fetch_name().returning(|_| Ok(None));
        store.expect_list_emails().returning(|_| Ok(Vec::new()));

        let users = adapter(store).list(None, 500).await.unwrap();
        let ids: Vec<&str> = users.iter().map(|user| user.id.as_str()).collect();
        assert_eq!(ids, vec![first.to_string(), second.to_string()]);
    }

    #[tokio::test]
    async fn test_total_count_delegates_to_the_estimate() {
        let mut store = MockStore::new();
        store.expect_approximate_count().returning(|| Ok(1234));
        assert_eq!(adapter(store).total_count().await.unwrap(), 1234);
    }
}
