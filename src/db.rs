use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use rusqlite::{params, Connection};

use crate::model::PropertyData;
use crate::pipeline::Store;
use crate::scoring::AnalysisResult;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS properties (
            url          TEXT PRIMARY KEY,
            site         TEXT NOT NULL,
            property_id  TEXT NOT NULL,
            title        TEXT NOT NULL,
            price        REAL,
            area         REAL,
            rooms        INTEGER,
            bathrooms    INTEGER,
            location     TEXT,
            data         TEXT NOT NULL,
            scraped_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_properties_site ON properties(site);

        CREATE TABLE IF NOT EXISTS analyses (
            id                INTEGER PRIMARY KEY,
            url               TEXT NOT NULL REFERENCES properties(url),
            overall_score     INTEGER NOT NULL,
            listing_quality   INTEGER NOT NULL,
            space_efficiency  INTEGER NOT NULL,
            data_completeness INTEGER NOT NULL,
            critical          BOOLEAN NOT NULL,
            result            TEXT NOT NULL,
            analyzed_at       TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_analyses_url ON analyses(url);
        ",
    )?;
    Ok(())
}

/// SQLite-backed [`Store`]. Every analysis is kept; a property row is
/// replaced by its latest scrape.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = connect(path)?;
        init_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("store connection lock poisoned"))
    }

    /// Stored listings, newest scrape first.
    pub fn fetch_properties(&self, limit: Option<usize>) -> Result<Vec<PropertyData>> {
        let conn = self.lock()?;
        let sql = match limit {
            Some(n) => format!("SELECT data FROM properties ORDER BY scraped_at DESC LIMIT {}", n),
            None => "SELECT data FROM properties ORDER BY scraped_at DESC".to_string(),
        };
        let mut stmt = conn.prepare(&sql)?;
        let raw = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let mut out = Vec::with_capacity(raw.len());
        for json in raw {
            out.push(serde_json::from_str(&json)?);
        }
        Ok(out)
    }

    /// Batch insert, one transaction.
    pub fn save_analyses(&self, rows: &[(PropertyData, AnalysisResult)]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_ANALYSIS)?;
            for (data, analysis) in rows {
                insert_analysis(&mut stmt, data, analysis)?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    pub fn get_stats(&self) -> Result<Stats> {
        let conn = self.lock()?;
        let count = |sql: &str| -> Result<i64> { Ok(conn.query_row(sql, [], |r| r.get(0))?) };

        let properties = count("SELECT COUNT(*) FROM properties")?;
        let analyses = count("SELECT COUNT(*) FROM analyses")?;
        let critical = count("SELECT COUNT(*) FROM analyses WHERE critical = 1")?;
        let avg_score: Option<f64> = conn.query_row(
            "SELECT AVG(overall_score) FROM analyses WHERE critical = 0",
            [],
            |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(
            "SELECT site, COUNT(*) FROM properties GROUP BY site ORDER BY COUNT(*) DESC, site",
        )?;
        let by_site = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Stats {
            properties,
            analyses,
            critical,
            avg_score,
            by_site,
        })
    }
}

const INSERT_ANALYSIS: &str = "INSERT INTO analyses
    (url, overall_score, listing_quality, space_efficiency, data_completeness, critical, result, analyzed_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

fn insert_analysis(
    stmt: &mut rusqlite::Statement,
    data: &PropertyData,
    a: &AnalysisResult,
) -> Result<()> {
    stmt.execute(params![
        data.url,
        a.overall_score.score,
        a.listing_quality.score,
        a.space_efficiency.score,
        a.data_completeness.score,
        a.data_quality.has_critical_issues,
        serde_json::to_string(a)?,
        a.analyzed_at.to_rfc3339(),
    ])?;
    Ok(())
}

impl Store for SqliteStore {
    fn store_property(&self, data: &PropertyData) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO properties
                (url, site, property_id, title, price, area, rooms, bathrooms, location, data, scraped_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(url) DO UPDATE SET
                site = excluded.site, property_id = excluded.property_id, title = excluded.title,
                price = excluded.price, area = excluded.area, rooms = excluded.rooms,
                bathrooms = excluded.bathrooms, location = excluded.location,
                data = excluded.data, scraped_at = excluded.scraped_at,
                updated_at = datetime('now')",
            params![
                data.url,
                data.site.as_str(),
                data.property_id,
                data.title,
                data.price,
                data.area,
                data.rooms,
                data.bathrooms,
                data.location,
                serde_json::to_string(data)?,
                data.scraped_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn store_analysis(&self, data: &PropertyData, analysis: &AnalysisResult) -> Result<()> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(INSERT_ANALYSIS)?;
        insert_analysis(&mut stmt, data, analysis)
    }
}

pub struct Stats {
    pub properties: i64,
    pub analyses: i64,
    pub critical: i64,
    pub avg_score: Option<f64>,
    pub by_site: Vec<(String, i64)>,
}

// ── Tests ──
