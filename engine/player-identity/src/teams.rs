//! NFL team abbreviations as the different providers spell them.
//!
//! Yahoo uses mixed case ("Buf", "Was"), Tank01 uses "WSH" for Washington,
//! and older feeds still carry relocated codes. Everything is mapped onto one
//! upper-case standard code so `team_equal` compares like with like.

/// A franchise with its standard code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Franchise {
    pub code: &'static str,
    pub city: &'static str,
    pub name: &'static str,
}

const FRANCHISES: [Franchise; 32] = [
    Franchise { code: "ARI", city: "Arizona", name: "Arizona Cardinals" },
    Franchise { code: "ATL", city: "Atlanta", name: "Atlanta Falcons" },
    Franchise { code: "BAL", city: "Baltimore", name: "Baltimore Ravens" },
    Franchise { code: "BUF", city: "Buffalo", name: "Buffalo Bills" },
    Franchise { code: "CAR", city: "Carolina", name: "Carolina Panthers" },
    Franchise { code: "CHI", city: "Chicago", name: "Chicago Bears" },
    Franchise { code: "CIN", city: "Cincinnati", name: "Cincinnati Bengals" },
    Franchise { code: "CLE", city: "Cleveland", name: "Cleveland Browns" },
    Franchise { code: "DAL", city: "Dallas", name: "Dallas Cowboys" },
    Franchise { code: "DEN", city: "Denver", name: "Denver Broncos" },
    Franchise { code: "DET", city: "Detroit", name: "Detroit Lions" },
    Franchise { code: "GB", city: "Green Bay", name: "Green Bay Packers" },
    Franchise { code: "HOU", city: "Houston", name: "Houston Texans" },
    Franchise { code: "IND", city: "Indianapolis", name: "Indianapolis Colts" },
    Franchise { code: "JAX", city: "Jacksonville", name: "Jacksonville Jaguars" },
    Franchise { code: "KC", city: "Kansas City", name: "Kansas City Chiefs" },
    Franchise { code: "LV", city: "Las Vegas", name: "Las Vegas Raiders" },
    Franchise { code: "LAC", city: "Los Angeles", name: "Los Angeles Chargers" },
    Franchise { code: "LAR", city: "Los Angeles", name: "Los Angeles Rams" },
    Franchise { code: "MIA", city: "Miami", name: "Miami Dolphins" },
    Franchise { code: "MIN", city: "Minnesota", name: "Minnesota Vikings" },
    Franchise { code: "NE", city: "New England", name: "New England Patriots" },
    Franchise { code: "NO", city: "New Orleans", name: "New Orleans Saints" },
    Franchise { code: "NYG", city: "New York", name: "New York Giants" },
    Franchise { code: "NYJ", city: "New York", name: "New York Jets" },
    Franchise { code: "PHI", city: "Philadelphia", name: "Philadelphia Eagles" },
    Franchise { code: "PIT", city: "Pittsburgh", name: "Pittsburgh Steelers" },
    Franchise { code: "SF", city: "San Francisco", name: "San Francisco 49ers" },
    Franchise { code: "SEA", city: "Seattle", name: "Seattle Seahawks" },
    Franchise { code: "TB", city: "Tampa Bay", name: "Tampa Bay Buccaneers" },
    Franchise { code: "TEN", city: "Tennessee", name: "Tennessee Titans" },
    Franchise { code: "WAS", city: "Washington", name: "Washington Commanders" },
];

/// Non-standard codes seen in provider payloads
const ALIASES: [(&str, &str); 10] = [
    ("WSH", "WAS"),
    ("JAC", "JAX"),
    ("LA", "LAR"),
    ("STL", "LAR"),
    ("SD", "LAC"),
    ("OAK", "LV"),
    ("GNB", "GB"),
    ("KAN", "KC"),
    ("NWE", "NE"),
    ("NOR", "NO"),
];

/// Standard upper-case code for any provider spelling.
///
/// Unknown codes are upper-cased and passed through; blank input stays blank.
pub fn canonical_team(code: &str) -> String {
    let upper = code.trim().to_uppercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map(|(_, standard)| (*standard).to_string())
        .unwrap_or(upper)
}

/// Franchise details for a code in any provider spelling
pub fn franchise(code: &str) -> Option<&'static Franchise> {
    let standard = canonical_team(code);
    FRANCHISES.iter().find(|f| f.code == standard)
}

/// Full franchise name, e.g. "BUF" -> "Buffalo Bills"
pub fn team_name(code: &str) -> Option<&'static str> {
    franchise(code).map(|f| f.name)
}
