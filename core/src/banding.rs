/// One label band. `upper` is exclusive: a score lands here when it is below
/// `upper` and did not match an earlier band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub upper: f64,
    pub label: &'static str,
    pub message: &'static str,
}

pub const SALARY_BANDS: &[Band] = &[
    Band {
        upper: 50_000.0,
        label: "Entry Level",
        message: "Starting salary range. Great beginning to your career!",
    },
    Band {
        upper: 80_000.0,
        label: "Mid Level",
        message: "Competitive mid-career salary. You're growing professionally!",
    },
    Band {
        upper: 120_000.0,
        label: "Senior Level",
        message: "Strong senior-level compensation. Excellent career progress!",
    },
    Band {
        upper: f64::INFINITY,
        label: "Executive Level",
        message: "Top-tier executive compensation. Outstanding achievement!",
    },
];

pub const BURNOUT_BANDS: &[Band] = &[
    Band {
        upper: 30.0,
        label: "Low",
        message: "You're managing stress well. Keep it up!",
    },
    Band {
        upper: 60.0,
        label: "Moderate",
        message: "Consider taking breaks and managing workload.",
    },
    Band {
        upper: f64::INFINITY,
        label: "High",
        message: "High burnout risk detected. Please prioritize self-care.",
    },
];

/// First band whose upper bound exceeds `score`. Returns `None` only for NaN
/// or `+inf`.
pub fn classify(bands: &'static [Band], score: f64) -> Option<&'static Band> {
    bands.iter().find(|band| score < band.upper)
}

/// Checks that a table is strictly ascending and closed at `+inf`.
pub fn is_well_formed(bands: &[Band]) -> bool {
    let ascending = bands
        .windows(2)
        .all(|pair| pair[0].upper < pair[1].upper);
    let closed = bands
        .last()
        .map(|band| band.upper == f64::INFINITY)
        .unwrap_or(false);
    ascending && closed
}
