//! LMDB environment setup and schema versioning.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RwTxn};

use crate::LmdbError;

/// The schema version that the current code expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Default map size: 1 GiB.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

const MAX_DBS: u32 = 16;
const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Named databases within the environment.
pub(crate) struct Databases {
    /// `event_id` → `Event`
    pub events: Database<Bytes, Bytes>,
    /// `poll_id` → `Poll`
    pub polls: Database<Bytes, Bytes>,
    /// `event_id ++ 0 ++ created_at_be ++ poll_id` → `poll_id`
    pub event_polls: Database<Bytes, Bytes>,
    /// `entry_id` → `Entry`
    pub entries: Database<Bytes, Bytes>,
    /// `poll_id ++ 0 ++ seq_be` → `entry_id`
    pub poll_entries: Database<Bytes, Bytes>,
    /// `poll_id ++ 0 ++ token_id` → `VoterToken`
    pub voters: Database<Bytes, Bytes>,
    /// `poll_id ++ 0 ++ judge_id` → `Judge`
    pub judges: Database<Bytes, Bytes>,
    /// `poll_id ++ 0 ++ email` → `judge_id`
    pub judge_emails: Database<Bytes, Bytes>,
    /// `poll_id ++ 0 ++ member_key` → `Ballot`
    pub ballots: Database<Bytes, Bytes>,
    /// `event_id ++ 0 ++ type_key` → `Commitment`
    pub commitments: Database<Bytes, Bytes>,
    /// `commitment_id` → `event_id ++ 0 ++ type_key`
    pub commitment_ids: Database<Bytes, Bytes>,
    /// `event_id ++ 0 ++ seq_be` → `ParticipationRecord`
    pub participation: Database<Bytes, Bytes>,
    pub meta: Database<Bytes, Bytes>,
}

/// LMDB-backed implementation of every `verdict-store` trait.
pub struct LmdbStore {
    pub(crate) env: Arc<Env>,
    pub(crate) dbs: Databases,
}

fn open_db(env: &Env, wtxn: &mut RwTxn, name: &str) -> Result<Database<Bytes, Bytes>, LmdbError> {
    Ok(env.create_database(wtxn, Some(name))?)
}

impl LmdbStore {
    /// Open or create an LMDB environment at `path`.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: each data directory is opened by a single `LmdbStore` per
        // process and the files are not modified by anything else while open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let dbs = Databases {
            events: open_db(&env, &mut wtxn, "events")?,
            polls: open_db(&env, &mut wtxn, "polls")?,
            event_polls: open_db(&env, &mut wtxn, "event_polls")?,
            entries: open_db(&env, &mut wtxn, "entries")?,
            poll_entries: open_db(&env, &mut wtxn, "poll_entries")?,
            voters: open_db(&env, &mut wtxn, "voters")?,
            judges: open_db(&env, &mut wtxn, "judges")?,
            judge_emails: open_db(&env, &mut wtxn, "judge_emails")?,
            ballots: open_db(&env, &mut wtxn, "ballots")?,
            commitments: open_db(&env, &mut wtxn, "commitments")?,
            commitment_ids: open_db(&env, &mut wtxn, "commitment_ids")?,
            participation: open_db(&env, &mut wtxn, "participation")?,
            meta: open_db(&env, &mut wtxn, "meta")?,
        };
        wtxn.commit()?;

        let store = Self {
            env: Arc::new(env),
            dbs,
        };
        store.check_schema()?;
        tracing::info!(path = %path.display(), map_size, "opened LMDB store");
        Ok(store)
    }

    /// Stored schema version; 0 for a fresh database.
    pub fn schema_version(&self) -> Result<u32, LmdbError> {
        let rtxn = self.env.read_txn()?;
        match self.dbs.meta.get(&rtxn, SCHEMA_VERSION_KEY)? {
            Some(bytes) => {
                let arr: [u8; 4] = bytes.try_into().map_err(|_| {
                    LmdbError::Serialization(format!(
                        "schema version has {} bytes, expected 4",
                        bytes.len()
                    ))
                })?;
                Ok(u32::from_le_bytes(arr))
            }
            None => Ok(0),
        }
    }

    /// Refuse databases written by a newer schema; stamp fresh ones.
    fn check_schema(&self) -> Result<(), LmdbError> {
        let found = self.schema_version()?;
        if found == CURRENT_SCHEMA_VERSION {
            tracing::debug!(version = found, "database schema is up to date");
            return Ok(());
        }
        if found > CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::SchemaTooNew {
                found,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }

        let mut wtxn = self.env.write_txn()?;
        self.dbs.meta.put(
            &mut wtxn,
            SCHEMA_VERSION_KEY,
            &CURRENT_SCHEMA_VERSION.to_le_bytes(),
        )?;
        wtxn.commit()?;
        tracing::info!(from = found, to = CURRENT_SCHEMA_VERSION, "stamped schema version");
        Ok(())
    }
}
