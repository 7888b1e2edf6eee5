//! Generic batched relation attachment.
//!
//! Primary records reference other tables through UUID-valued attributes with
//! no enforced referential integrity. Resolving those references row-by-row
//! would issue one query per record; this helper collects the distinct UUIDs
//! for a relation, fetches the referenced table once, indexes it, and maps the
//! resolved objects back onto the page. A dangling reference resolves to
//! `None` and callers attach an empty relation object in its place.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;

/// Implemented by referenced rows so fetched batches can be indexed by UUID.
pub trait UuidKeyed {
    fn uuid_key(&self) -> &str;
}

/// Attaches one relation onto a page of primary records.
///
/// `key_of` extracts the relation UUID from a record (blank values are treated
/// as absent), `fetch` loads the referenced rows for a deduplicated UUID batch
/// (callers filter to not-deleted), and `attach` writes the resolved row onto
/// the record. `fetch` runs at most once per call, never per row.
pub async fn attach_relation<P, R, Fut, E>(
    records: &mut [P],
    key_of: impl Fn(&P) -> Option<String>,
    fetch: impl FnOnce(Vec<String>) -> Fut,
    attach: impl Fn(&mut P, Option<&R>),
) -> Result<(), E>
where
    R: UuidKeyed,
    Fut: Future<Output = Result<Vec<R>, E>>,
{
    let wanted: BTreeSet<String> = records
        .iter()
        .filter_map(&key_of)
        .filter(|k| !k.trim().is_empty())
        .collect();

    if wanted.is_empty() {
        for record in records.iter_mut() {
            attach(record, None);
        }
        return Ok(());
    }

    let fetched = fetch(wanted.into_iter().collect()).await?;
    let index: HashMap<&str, &R> = fetched.iter().map(|r| (r.uuid_key(), r)).collect();

    for record in records.iter_mut() {
        let resolved = key_of(record).and_then(|k| index.get(k.as_str()).copied());
        attach(record, resolved);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        company_uuid: String,
        company_name: Option<String>,
    }

    struct Company {
        uuid: String,
        name: String,
    }

    impl UuidKeyed for Company {
        fn uuid_key(&self) -> &str {
            &self.uuid
        }
    }

    #[tokio::test]
    async fn test_attach_deduplicates_and_resolves() {
        let mut rows = vec![
            Row {
                company_uuid: "c-1".to_string(),
                company_name: None,
            },
            Row {
                company_uuid: "c-1".to_string(),
                company_name: None,
            },
            Row {
                company_uuid: "c-2".to_string(),
                company_name: None,
            },
        ];

        let mut fetch_calls = 0;
        let result: Result<(), ()> = attach_relation(
            &mut rows,
            |r| Some(r.company_uuid.clone()),
            |uuids| {
                fetch_calls += 1;
                assert_eq!(uuids, vec!["c-1".to_string(), "c-2".to_string()]);
                async move {
                    Ok(vec![
                        Company {
                            uuid: "c-1".to_string(),
                            name: "Ladang Hijau".to_string(),
                        },
                        Company {
                            uuid: "c-2".to_string(),
                            name: "Sayur Segar".to_string(),
                        },
                    ])
                }
            },
            |r, company| r.company_name = company.map(|c| c.name.clone()),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(fetch_calls, 1);
        assert_eq!(rows[0].company_name.as_deref(), Some("Ladang Hijau"));
        assert_eq!(rows[1].company_name.as_deref(), Some("Ladang Hijau"));
        assert_eq!(rows[2].company_name.as_deref(), Some("Sayur Segar"));
    }

    #[tokio::test]
    async fn test_dangling_reference_resolves_to_none() {
        let mut rows = vec![Row {
            company_uuid: "missing".to_string(),
            company_name: None,
        }];

        let result: Result<(), ()> = attach_relation(
            &mut rows,
            |r| Some(r.company_uuid.clone()),
            |_uuids| async move { Ok(Vec::<Company>::new()) },
            |r, company| r.company_name = company.map(|c| c.name.clone()),
        )
        .await;

        assert!(result.is_ok());
        assert!(rows[0].company_name.is_none());
    }

    #[tokio::test]
    async fn test_blank_keys_skip_fetch() {
        let mut rows = vec![Row {
            company_uuid: String::new(),
            company_name: None,
        }];

        let result: Result<(), ()> = attach_relation(
            &mut rows,
            |r| Some(r.company_uuid.clone()),
            |_uuids| async move {
                panic!("fetch must not run for blank keys");
            },
            |r, company: Option<&Company>| r.company_name = company.map(|c| c.name.clone()),
        )
        .await;

        assert!(result.is_ok());
        assert!(rows[0].company_name.is_none());
    }
}
