//! CSV fixtures for integration tests.
#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use podium::{Engine, EngineConfig};
use tempfile::TempDir;

pub const EVENTS_HEADER: &str =
    "ID,Name,Sex,Age,Height,Weight,Team,NOC,Games,Year,Season,City,Sport,Event,Medal";

/// One athlete result. `medal` of `None` is written as `NA`.
pub struct Event<'a> {
    pub name: &'a str,
    pub noc: &'a str,
    pub year: i64,
    pub season: &'a str,
    pub sport: &'a str,
    pub medal: Option<&'a str>,
}

impl<'a> Event<'a> {
    pub fn new(name: &'a str, noc: &'a str, year: i64, medal: Option<&'a str>) -> Self {
        Self {
            name,
            noc,
            year,
            season: "Summer",
            sport: "Athletics",
            medal,
        }
    }

    pub fn sport(mut self, sport: &'a str) -> Self {
        self.sport = sport;
        self
    }

    pub fn season(mut self, season: &'a str) -> Self {
        self.season = season;
        self
    }

    fn line(&self, id: usize) -> String {
        let city = if self.season == "Winter" { "Sochi" } else { "London" };
        format!(
            "{id},{name},M,25,180,75,{noc},{noc},{year} {season},{year},{season},{city},{sport},{sport} Event,{medal}",
            name = csv_field(self.name),
            noc = self.noc,
            year = self.year,
            season = self.season,
            sport = self.sport,
            medal = self.medal.unwrap_or("NA"),
        )
    }
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// A data directory in a temp dir; removed on drop.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    pub fn write_events(&self, events: &[Event<'_>]) -> PathBuf {
        let mut text = String::from(EVENTS_HEADER);
        text.push('\n');
        for (i, e) in events.iter().enumerate() {
            text.push_str(&e.line(i + 1));
            text.push('\n');
        }
        self.write("events.csv", &text)
    }

    pub fn write_countries(&self, pairs: &[(&str, &str)]) -> PathBuf {
        let mut text = String::from("NOC,region,notes\n");
        for (noc, region) in pairs {
            text.push_str(&format!("{noc},{},\n", csv_field(region)));
        }
        self.write("countries.csv", &text)
    }

    /// Rows of (NOC, Year, Population, GDP_USD); empty strings stay empty cells.
    pub fn write_stats(&self, rows: &[(&str, i64, &str, &str)]) -> PathBuf {
        let mut text = String::from("NOC,Year,Population,GDP_USD\n");
        for (noc, year, pop, gdp) in rows {
            text.push_str(&format!("{noc},{year},{pop},{gdp}\n"));
        }
        self.write("country_year_stats.csv", &text)
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            data_dir: self.dir.path().to_path_buf(),
            ..EngineConfig::default()
        }
    }

    pub fn engine(&self) -> Engine {
        Engine::new(self.config()).expect("Failed to build engine")
    }
}

/// Small, hand-checked dataset shared by the query tests.
///
/// 2012 medals: USA 2 (one in Swimming), CHN 1. FRA has no 2012 medal.
/// CHN's population is 0 so its per-capita ratio is null; KOR has no region.
pub fn olympics() -> Fixture {
    let fx = Fixture::new();
    fx.write_events(&[
        Event::new("John Smith", "USA", 2012, Some("Gold")).sport("Swimming"),
        Event::new("Marie Dubois", "FRA", 2012, None).sport("Fencing"),
        Event::new("Anna Smithson", "USA", 2016, Some("Silver")),
        Event::new("Lee Wong", "CHN", 2012, Some("Bronze")).sport("Diving"),
        Event::new("Pierre Martin", "FRA", 2014, Some("Gold"))
            .sport("Alpine Skiing")
            .season("Winter"),
        Event::new("Kim Park", "KOR", 2012, Some("Silver")).sport("Archery"),
        Event::new("Joe Smith", "USA", 2012, Some("Bronze")),
    ]);
    fx.write_countries(&[
        ("USA", "United States"),
        ("FRA", "France"),
        ("CHN", "China"),
    ]);
    fx.write_stats(&[
        ("USA", 2012, "313000000", "16000000000000"),
        ("CHN", 2012, "0", "8500000000000"),
        ("FRA", 2012, "65000000", ""),
    ]);
    fx
}

/// Write `rows` synthetic events rows straight to disk.
pub fn write_large_events(path: &Path, rows: usize) {
    let file = File::create(path).expect("Failed to create test file");
    let mut w = BufWriter::new(file);
    writeln!(w, "{EVENTS_HEADER}").expect("Failed to write header");
    let nocs = ["USA", "FRA", "CHN", "GBR", "GER"];
    let medals = ["Gold", "Silver", "Bronze", "NA", "NA", "NA"];
    for i in 0..rows {
        let noc = nocs[i % nocs.len()];
        let year = 1896 + 4 * (i % 30) as i64;
        writeln!(
            w,
            "{i},Athlete {i},F,{age},170,60,{noc},{noc},{year} Summer,{year},Summer,City,Sport{s},Event {s},{medal}",
            age = 18 + i % 20,
            s = i % 12,
            medal = medals[i % medals.len()],
        )
        .expect("Failed to write row");
    }
    w.flush().expect("Failed to flush");
}
