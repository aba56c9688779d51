//! Insurance profile configuration.
//!
//! ## File format
//!
//! A TOML document whose top-level tables are named profiles. A `[DEFAULT]`
//! table is required; any other table (typically one per city) overrides
//! individual keys and inherits the rest from `DEFAULT`. Profile names are
//! matched case-insensitively.
//!
//! | Key                       | Legacy alias | Required | Meaning                          |
//! |---------------------------|--------------|----------|----------------------------------|
//! | `base_floor`              | `JiShuL`     | yes      | Lower bound of insurance base    |
//! | `base_ceiling`            | `JiShuH`     | yes      | Upper bound of insurance base    |
//! | `pension`                 | `YangLao`    | yes      | Pension contribution rate        |
//! | `medical`                 | `YiLiao`     | yes      | Medical contribution rate        |
//! | `unemployment`            | `ShiYe`      | yes      | Unemployment contribution rate   |
//! | `work_injury`             | `GongShang`  | yes      | Work-injury contribution rate    |
//! | `maternity`               | `ShengYu`    | yes      | Maternity contribution rate      |
//! | `housing_fund`            | `GongJiJin`  | yes      | Housing fund contribution rate   |
//! | `income_tax_start_point`  |              | no       | Exemption threshold (3500)       |
//!
//! Values may be integers, floats, or numeric strings.
//!
//! ### Example
//!
//! ```toml
//! [DEFAULT]
//! base_floor = 2193.00
//! base_ceiling = 16446.00
//! pension = 0.08
//! medical = 0.02
//! unemployment = 0.005
//! work_injury = 0
//! maternity = 0
//! housing_fund = 0.06
//!
//! [CHENGDU]
//! base_floor = 2000
//! base_ceiling = 15000
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use netpay_core::calculations::DEFAULT_INCOME_TAX_START_POINT;
use netpay_core::{InsuranceParameters, InsuranceParametersError};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the mandatory fallback profile.
pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// `(key, legacy alias)` for each contribution-rate component.
const RATE_KEYS: [(&str, &str); 6] = [
    ("pension", "YangLao"),
    ("medical", "YiLiao"),
    ("unemployment", "ShiYe"),
    ("work_injury", "GongShang"),
    ("maternity", "ShengYu"),
    ("housing_fund", "GongJiJin"),
];

const FLOOR_KEY: (&str, &str) = ("base_floor", "JiShuL");
const CEILING_KEY: (&str, &str) = ("base_ceiling", "JiShuH");
const START_POINT_KEY: &str = "income_tax_start_point";

/// Errors raised while loading or resolving a profile. All are fatal and
/// occur before any record is processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("cannot read config file '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("config is not valid TOML: {0}")]
    Syntax(String),

    #[error("top-level entry '{0}' is not a profile table")]
    NotATable(String),

    #[error("profile '{0}' is defined more than once")]
    DuplicateProfile(String),

    #[error("config has no [DEFAULT] profile")]
    MissingDefault,

    #[error("profile '{profile}' is missing key '{key}'")]
    MissingKey { profile: String, key: String },

    #[error("profile '{profile}' key '{key}' is not a number: {value}")]
    NotNumeric {
        profile: String,
        key: String,
        value: String,
    },

    #[error("profile '{profile}' is invalid: {source}")]
    Invalid {
        profile: String,
        #[source]
        source: InsuranceParametersError,
    },
}

/// A fully resolved profile, ready to configure a
/// [`TaxEngine`](netpay_core::TaxEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Upper-cased name of the profile actually used.
    pub name: String,
    pub insurance: InsuranceParameters,
    pub income_tax_start_point: Decimal,
}

/// All profiles from one configuration file, keyed by upper-cased name.
#[derive(Debug, Clone)]
pub struct ProfileSet {
    profiles: HashMap<String, toml::Table>,
}

impl FromStr for ProfileSet {
    type Err = ProfileError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let document: toml::Table = text
            .parse()
            .map_err(|e: toml::de::Error| ProfileError::Syntax(e.message().to_string()))?;

        let mut profiles = HashMap::with_capacity(document.len());
        for (name, value) in document {
            let toml::Value::Table(table) = value else {
                return Err(ProfileError::NotATable(name));
            };
            let key = name.to_uppercase();
            if profiles.insert(key.clone(), table).is_some() {
                return Err(ProfileError::DuplicateProfile(key));
            }
        }

        if !profiles.contains_key(DEFAULT_PROFILE) {
            return Err(ProfileError::MissingDefault);
        }

        Ok(Self { profiles })
    }
}

impl ProfileSet {
    /// Reads and parses the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Read`] if the file cannot be read, or any
    /// parse error from [`ProfileSet::from_str`].
    pub fn from_path(path: &Path) -> Result<Self, ProfileError> {
        let text = std::fs::read_to_string(path).map_err(|e| ProfileError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        text.parse()
    }

    /// Profile names, sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolves the profile for `city`, falling back to `DEFAULT` when no
    /// city is given or the city is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] if a required key is missing from both the
    /// selected profile and `DEFAULT`, a value is not numeric, or the
    /// resulting parameters are invalid.
    pub fn resolve(
        &self,
        city: Option<&str>,
    ) -> Result<Profile, ProfileError> {
        let name = match city.map(str::to_uppercase) {
            Some(name) if self.profiles.contains_key(&name) => name,
            Some(name) => {
                warn!(city = %name, "unknown profile; using DEFAULT");
                DEFAULT_PROFILE.to_string()
            }
            None => DEFAULT_PROFILE.to_string(),
        };

        let base_floor = self.required(&name, FLOOR_KEY)?;
        let base_ceiling = self.required(&name, CEILING_KEY)?;
        let rates = RATE_KEYS
            .iter()
            .map(|&key| self.required(&name, key))
            .collect::<Result<Vec<_>, _>>()?;
        let income_tax_start_point = self
            .lookup(&name, &[START_POINT_KEY])?
            .unwrap_or(DEFAULT_INCOME_TAX_START_POINT);

        let insurance = InsuranceParameters::from_components(base_floor, base_ceiling, rates)
            .map_err(|source| ProfileError::Invalid {
                profile: name.clone(),
                source,
            })?;

        debug!(
            profile = %name,
            base_floor = %insurance.base_floor(),
            base_ceiling = %insurance.base_ceiling(),
            combined_rate = %insurance.combined_rate(),
            "resolved insurance profile"
        );

        Ok(Profile {
            name,
            insurance,
            income_tax_start_point,
        })
    }

    fn required(
        &self,
        profile: &str,
        (key, alias): (&str, &str),
    ) -> Result<Decimal, ProfileError> {
        self.lookup(profile, &[key, alias])?
            .ok_or_else(|| ProfileError::MissingKey {
                profile: profile.to_string(),
                key: key.to_string(),
            })
    }

    /// Finds the first of `keys` in `profile`, then in `DEFAULT`.
    fn lookup(
        &self,
        profile: &str,
        keys: &[&str],
    ) -> Result<Option<Decimal>, ProfileError> {
        for section in [profile, DEFAULT_PROFILE] {
            let Some(table) = self.profiles.get(section) else {
                continue;
            };
            for key in keys {
                if let Some(value) = table.get(*key) {
                    return to_decimal(value)
                        .map(Some)
                        .ok_or_else(|| ProfileError::NotNumeric {
                            profile: section.to_string(),
                            key: key.to_string(),
                            value: value.to_string(),
                        });
                }
            }
        }
        Ok(None)
    }
}

fn to_decimal(value: &toml::Value) -> Option<Decimal> {
    match value {
        toml::Value::Integer(i) => Some(Decimal::from(*i)),
        // f64 Display is the shortest round-trip form, so 0.08 stays 0.08.
        toml::Value::Float(f) => Decimal::from_str(&f.to_string()).ok(),
        toml::Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}
