//! Predefined probe profiles for the platform simulator
//! Location: src/hal/simulation/profiles.rs

use serde::{Deserialize, Serialize};

/// Transducer characteristics reported by the simulated platform
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProbeProfile {
    pub key: String,
    pub name: String,
    pub code: i32,
    pub element_count: u32,
    pub center_frequency_hz: i32,
}

impl ProbeProfile {
    /// SA4-2/24 phased array
    pub fn phased_sa4_2() -> Self {
        Self {
            key: "sa4-2".to_string(),
            name: "SA4-2/24".to_string(),
            code: 11,
            element_count: 64,
            center_frequency_hz: 2_500_000,
        }
    }

    /// L14-5/38 linear
    pub fn linear_l14_5() -> Self {
        Self {
            key: "l14-5".to_string(),
            name: "L14-5/38".to_string(),
            code: 2,
            element_count: 128,
            center_frequency_hz: 7_200_000,
        }
    }

    /// C5-2/60 convex
    pub fn convex_c5_2() -> Self {
        Self {
            key: "c5-2".to_string(),
            name: "C5-2/60".to_string(),
            code: 6,
            element_count: 128,
            center_frequency_hz: 3_300_000,
        }
    }

    /// EC9-5/10 endovaginal microconvex
    pub fn microconvex_ec9_5() -> Self {
        Self {
            key: "ec9-5".to_string(),
            name: "EC9-5/10".to_string(),
            code: 9,
            element_count: 128,
            center_frequency_hz: 6_600_000,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::phased_sa4_2(),
            Self::linear_l14_5(),
            Self::convex_c5_2(),
            Self::microconvex_ec9_5(),
        ]
    }

    /// Look up a profile by key (`sa4-2`) or name (`SA4-2/24`), case-insensitive
    pub fn find(key: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|p| p.key.eq_ignore_ascii_case(key) || p.name.eq_ignore_ascii_case(key))
    }
}

impl Default for ProbeProfile {
    fn default() -> Self {
        Self::phased_sa4_2()
    }
}
