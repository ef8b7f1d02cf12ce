//! Persistance SQLite des stations de l'utilisateur
//!
//! Une seule base contient quatre tables :
//!
//! - `favorites` : stations favorites, ordonnées par `sort_id`
//! - `locals` : stations ajoutées à la main, ordonnées par `sort_id`
//! - `recents` : dernières stations écoutées, la plus récente en tête
//! - `settings` : paires clé/valeur (dernière station connue, ...)
//!
//! Les stations sont stockées en JSON ; les colonnes `name` et `sort_id`
//! servent uniquement au tri.

use crate::{Error, Result};
use orradio::models::validate_stream_url;
use orradio::{RadioStation, UNSORTED};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Nombre de stations récentes conservées par défaut
pub const DEFAULT_RECENT_MAX: usize = 10;

const LAST_KNOWN_KEY: &str = "last_known_station";

/// Liste ordonnable par l'utilisateur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationList {
    Favorites,
    Locals,
}

impl StationList {
    fn table(&self) -> &'static str {
        match self {
            StationList::Favorites => "favorites",
            StationList::Locals => "locals",
        }
    }
}

/// Magasin des stations favorites, locales et récentes
#[derive(Clone)]
pub struct StationStore {
    conn: Arc<Mutex<Connection>>,
    recent_max: usize,
}

impl std::fmt::Debug for StationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StationStore")
            .field("recent_max", &self.recent_max)
            .finish()
    }
}

impl StationStore {
    /// Ouvre (ou crée) la base à `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path).map_err(|e| {
            Error::PersistenceError(format!("Failed to open {}: {}", db_path.display(), e))
        })?;
        tracing::debug!(path = %db_path.display(), "Station database opened");
        Self::with_connection(conn)
    }

    /// Base en mémoire, utile pour les tests
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            recent_max: DEFAULT_RECENT_MAX,
        })
    }

    /// Fixe le nombre maximal de stations récentes (au moins 1)
    pub fn with_recent_max(mut self, recent_max: usize) -> Self {
        self.recent_max = recent_max.max(1);
        self
    }

    pub fn recent_max(&self) -> usize {
        self.recent_max
    }

    // ========================================================================
    // Favoris
    // ========================================================================

    /// Ajoute une station aux favoris
    ///
    /// Une station déjà favorite est mise à jour sans changer sa position ;
    /// une nouvelle station est placée en fin de liste.
    pub fn add_favorite(&self, station: &RadioStation) -> Result<()> {
        if !station.is_valid() {
            return Err(Error::InvalidStation(format!(
                "cannot add '{}' to favorites",
                station.name
            )));
        }
        let conn = self.conn.lock().unwrap();
        upsert_sorted(&conn, StationList::Favorites, station)?;
        tracing::info!(station = %station.name, "Added to favorites");
        Ok(())
    }

    /// Retire une station des favoris, renvoie `false` si elle n'y était pas
    pub fn remove_favorite(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute("DELETE FROM favorites WHERE id = ?1", params![id])? > 0;
        if removed {
            tracing::info!(station = id, "Removed from favorites");
        }
        Ok(removed)
    }

    pub fn is_favorite(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        exists(&conn, "favorites", id)
    }

    /// Bascule l'état favori, renvoie le nouvel état
    pub fn toggle_favorite(&self, station: &RadioStation) -> Result<bool> {
        if self.remove_favorite(&station.id)? {
            Ok(false)
        } else {
            self.add_favorite(station)?;
            Ok(true)
        }
    }

    /// Favoris triés par `sort_id` puis par nom
    pub fn favorites(&self) -> Result<Vec<RadioStation>> {
        let conn = self.conn.lock().unwrap();
        load_sorted(&conn, StationList::Favorites)
    }

    // ========================================================================
    // Stations locales
    // ========================================================================

    /// Enregistre une station ajoutée par l'utilisateur
    ///
    /// Le nom et l'URL sont validés ; un identifiant est généré si besoin.
    /// Renvoie la station telle qu'enregistrée.
    pub fn add_local(&self, station: &RadioStation) -> Result<RadioStation> {
        let mut local = if station.id.trim().is_empty() {
            let mut created = RadioStation::local(&station.name, &station.stream_url)?;
            created.image_url = station.image_url.clone();
            created.homepage = station.homepage.clone();
            created.country = station.country.clone();
            created.country_code = station.country_code.clone();
            created.genre = station.genre.clone();
            created.bitrate = station.bitrate;
            created
        } else {
            validated_local(station)?
        };
        local.sort_id = UNSORTED;

        let conn = self.conn.lock().unwrap();
        upsert_sorted(&conn, StationList::Locals, &local)?;
        tracing::info!(station = %local.name, id = %local.id, "Local station saved");
        decorate(&conn, local)
    }

    /// Crée une station locale à partir d'un nom et d'une URL
    pub fn create_local(&self, name: &str, stream_url: &str) -> Result<RadioStation> {
        let station = RadioStation::local(name, stream_url)?;
        self.add_local(&station)
    }

    /// Met à jour une station locale existante
    pub fn update_local(&self, station: &RadioStation) -> Result<()> {
        let local = validated_local(station)?;
        let conn = self.conn.lock().unwrap();
        if !exists(&conn, "locals", &local.id)? {
            return Err(Error::StationNotFound(local.id));
        }
        upsert_sorted(&conn, StationList::Locals, &local)?;

        // Un favori garde la copie à jour de la station
        if exists(&conn, "favorites", &local.id)? {
            upsert_sorted(&conn, StationList::Favorites, &local)?;
        }
        Ok(())
    }

    /// Supprime une station locale (et son éventuel favori)
    pub fn remove_local(&self, id: &str) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM locals WHERE id = ?1", params![id])? > 0;
        if removed {
            tx.execute("DELETE FROM favorites WHERE id = ?1", params![id])?;
            tx.execute("DELETE FROM recents WHERE id = ?1", params![id])?;
        }
        tx.commit()?;
        Ok(removed)
    }

    pub fn is_local(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        exists(&conn, "locals", id)
    }

    /// Stations locales triées par `sort_id` puis par nom
    pub fn locals(&self) -> Result<Vec<RadioStation>> {
        let conn = self.conn.lock().unwrap();
        load_sorted(&conn, StationList::Locals)
    }

    /// Réordonne une liste
    ///
    /// Chaque station de `ids` reçoit sa position comme `sort_id`. Les
    /// identifiants inconnus sont ignorés. Renvoie le nombre de stations
    /// mises à jour.
    pub fn update_sort_ids(&self, list: StationList, ids: &[String]) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let mut updated = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "UPDATE {} SET sort_id = ?1 WHERE id = ?2",
                list.table()
            ))?;
            for (position, id) in ids.iter().enumerate() {
                updated += stmt.execute(params![position as i64, id])?;
            }
        }
        tx.commit()?;
        tracing::debug!(list = list.table(), updated, "Sort order updated");
        Ok(updated)
    }

    // ========================================================================
    // Récents
    // ========================================================================

    /// Ajoute une station en tête des récents
    ///
    /// Une station déjà présente est déplacée en tête ; la liste est ensuite
    /// tronquée à `recent_max` entrées.
    pub fn add_recent(&self, station: &RadioStation) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO recents (id, data, seq)
             VALUES (?1, ?2, (SELECT COALESCE(MAX(seq), 0) + 1 FROM recents))
             ON CONFLICT(id) DO UPDATE SET
                data = excluded.data,
                seq = excluded.seq",
            params![station.id, serde_json::to_string(station)?],
        )?;
        let trimmed = tx.execute(
            "DELETE FROM recents WHERE id NOT IN
                (SELECT id FROM recents ORDER BY seq DESC LIMIT ?1)",
            params![self.recent_max as i64],
        )?;
        tx.commit()?;
        if trimmed > 0 {
            tracing::debug!(trimmed, "Recent stations trimmed");
        }
        Ok(())
    }

    /// Stations récentes, la plus récente en premier
    pub fn recents(&self) -> Result<Vec<RadioStation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT data FROM recents ORDER BY seq DESC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut stations = Vec::new();
        for data in rows {
            let station: RadioStation = serde_json::from_str(&data?)?;
            stations.push(decorate(&conn, station)?);
        }
        Ok(stations)
    }

    pub fn clear_recents(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM recents", [])?;
        Ok(())
    }

    // ========================================================================
    // Dernière station et réglages
    // ========================================================================

    /// Mémorise la dernière station jouée
    pub fn set_last_known(&self, station: &RadioStation) -> Result<()> {
        self.set_setting(LAST_KNOWN_KEY, &serde_json::to_string(station)?)
    }

    /// Dernière station jouée, si elle existe
    pub fn last_known(&self) -> Result<Option<RadioStation>> {
        let Some(data) = self.setting(LAST_KNOWN_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<RadioStation>(&data) {
            Ok(station) => {
                let conn = self.conn.lock().unwrap();
                Ok(Some(decorate(&conn, station)?))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable last known station");
                Ok(None)
            }
        }
    }

    pub fn setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    // ========================================================================
    // Recherche
    // ========================================================================

    /// Cherche une station connue localement (favoris, locales, récents)
    pub fn find(&self, id: &str) -> Result<Option<RadioStation>> {
        let conn = self.conn.lock().unwrap();
        for table in ["locals", "favorites", "recents"] {
            let data: Option<String> = conn
                .query_row(
                    &format!("SELECT data FROM {table} WHERE id = ?1"),
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(data) = data {
                let station: RadioStation = serde_json::from_str(&data)?;
                return Ok(Some(decorate(&conn, station)?));
            }
        }
        Ok(None)
    }

    /// Ajoute une station à une liste sans déplacer une entrée existante
    pub(crate) fn merge_into(&self, list: StationList, station: &RadioStation) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let existed = exists(&conn, list.table(), &station.id)?;
        upsert_sorted(&conn, list, station)?;
        Ok(!existed)
    }

    /// Remplace favoris et stations locales (import en mode remplacement)
    pub(crate) fn replace_all(
        &self,
        favorites: &[RadioStation],
        locals: &[RadioStation],
    ) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM favorites", [])?;
        tx.execute("DELETE FROM locals", [])?;
        for station in locals {
            insert_with_sort_id(&tx, StationList::Locals, station)?;
        }
        for station in favorites {
            insert_with_sort_id(&tx, StationList::Favorites, station)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    for table in ["favorites", "locals"] {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    sort_id INTEGER NOT NULL,
                    data TEXT NOT NULL
                )"
            ),
            [],
        )?;
    }
    conn.execute(
        "CREATE TABLE IF NOT EXISTS recents (
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            seq INTEGER NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

fn exists(conn: &Connection, table: &str, id: &str) -> Result<bool> {
    Ok(conn
        .query_row(
            &format!("SELECT 1 FROM {table} WHERE id = ?1"),
            params![id],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

pub(crate) fn validated_local(station: &RadioStation) -> Result<RadioStation> {
    let name = station.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidStation("station name is empty".into()));
    }
    let mut local = station.clone();
    local.name = name.to_string();
    local.stream_url = validate_stream_url(&station.stream_url)?;
    local.is_local = true;
    Ok(local)
}

/// Insère ou met à jour une station en conservant sa position existante
fn upsert_sorted(conn: &Connection, list: StationList, station: &RadioStation) -> Result<()> {
    let table = list.table();
    conn.execute(
        &format!(
            "INSERT INTO {table} (id, name, sort_id, data)
             VALUES (?1, ?2, (SELECT COALESCE(MAX(sort_id), -1) + 1 FROM {table}), ?3)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                data = excluded.data"
        ),
        params![station.id, station.name, serde_json::to_string(station)?],
    )?;
    Ok(())
}

/// Insère une station avec son `sort_id` (fin de liste s'il n'est pas fixé)
fn insert_with_sort_id(conn: &Connection, list: StationList, station: &RadioStation) -> Result<()> {
    if station.sort_id == UNSORTED {
        return upsert_sorted(conn, list, station);
    }
    let table = list.table();
    conn.execute(
        &format!(
            "INSERT INTO {table} (id, name, sort_id, data) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                sort_id = excluded.sort_id,
                data = excluded.data"
        ),
        params![
            station.id,
            station.name,
            station.sort_id as i64,
            serde_json::to_string(station)?
        ],
    )?;
    Ok(())
}

fn load_sorted(conn: &Connection, list: StationList) -> Result<Vec<RadioStation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT data, sort_id FROM {} ORDER BY sort_id ASC, name COLLATE NOCASE ASC",
        list.table()
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut stations = Vec::new();
    for row in rows {
        let (data, sort_id) = row?;
        let mut station: RadioStation = serde_json::from_str(&data)?;
        station.sort_id = sort_id as i32;
        stations.push(decorate(conn, station)?);
    }
    Ok(stations)
}

/// Positionne les drapeaux favori / local d'après les tables
fn decorate(conn: &Connection, mut station: RadioStation) -> Result<RadioStation> {
    station.is_favorite = exists(conn, "favorites", &station.id)?;
    station.is_local = exists(conn, "locals", &station.id)?;
    Ok(station)
}
