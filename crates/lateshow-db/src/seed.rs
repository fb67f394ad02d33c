use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use tracing::info;

use crate::Database;
use crate::queries::{insert_episode, insert_guest};

/// Row counts written by [`Database::seed_fixtures`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub guests: usize,
    pub episodes: usize,
    pub appearances: usize,
}

const GUESTS: &[(&str, &str)] = &[("Tom Hanks", "Actor"), ("Taylor Swift", "Singer")];

const EPISODES: &[((i32, u32, u32), i64)] = &[((2023, 1, 1), 1), ((2023, 1, 2), 2)];

/// (rating, guest index, episode index)
const APPEARANCES: &[(i64, usize, usize)] = &[(5, 0, 0), (4, 1, 0), (3, 0, 1)];

impl Database {
    /// Delete every row. Children first so foreign keys stay satisfied.
    pub fn reset(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "
                DELETE FROM appearances;
                DELETE FROM episodes;
                DELETE FROM guests;
                DELETE FROM users;
                ",
            )?;
            Ok(())
        })?;
        info!("Database reset");
        Ok(())
    }

    /// Load the development fixtures in a single transaction.
    pub fn seed_fixtures(&self) -> Result<SeedSummary> {
        let summary = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let mut guest_ids = Vec::with_capacity(GUESTS.len());
            for (name, occupation) in GUESTS {
                guest_ids.push(insert_guest(&tx, name, occupation)?);
            }

            let mut episode_ids = Vec::with_capacity(EPISODES.len());
            for ((y, m, d), number) in EPISODES {
                let date = NaiveDate::from_ymd_opt(*y, *m, *d)
                    .ok_or_else(|| anyhow!("Invalid fixture date {}-{}-{}", y, m, d))?;
                episode_ids.push(insert_episode(&tx, date, *number)?);
            }

            for (rating, guest, episode) in APPEARANCES {
                tx.execute(
                    "INSERT INTO appearances (rating, guest_id, episode_id) VALUES (?1, ?2, ?3)",
                    rusqlite::params![*rating, guest_ids[*guest], episode_ids[*episode]],
                )?;
            }

            tx.commit()?;
            Ok(SeedSummary {
                guests: guest_ids.len(),
                episodes: episode_ids.len(),
                appearances: APPEARANCES.len(),
            })
        })?;

        info!(
            "Seeded {} guests, {} episodes, {} appearances",
            summary.guests, summary.episodes, summary.appearances
        );
        Ok(summary)
    }
}
