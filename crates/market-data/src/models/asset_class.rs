use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Family of instruments that share the same set of price sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetClass {
    /// Exchange-traded shares and ETFs.
    Equity,
    /// Mutual fund units priced by NAV.
    MutualFund,
    /// Crypto assets priced against a fiat currency.
    Crypto,
}

impl AssetClass {
    pub const ALL: [AssetClass; 3] = [Self::Equity, Self::MutualFund, Self::Crypto];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equity => "equity",
            Self::MutualFund => "mutual-fund",
            Self::Crypto => "crypto",
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "equity" | "stock" => Ok(Self::Equity),
            "mutual-fund" | "mf" => Ok(Self::MutualFund),
            "crypto" => Ok(Self::Crypto),
            other => Err(format!("unknown asset class '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_asset_class() {
        assert_eq!("equity".parse::<AssetClass>(), Ok(AssetClass::Equity));
        assert_eq!("MUTUAL_FUND".parse::<AssetClass>(), Ok(AssetClass::MutualFund));
        assert_eq!("crypto".parse::<AssetClass>(), Ok(AssetClass::Crypto));
        assert!("bonds".parse::<AssetClass>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for class in AssetClass::ALL {
            assert_eq!(class.to_string().parse::<AssetClass>(), Ok(class));
        }
    }
}
