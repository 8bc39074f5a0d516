use serde::{Deserialize, Serialize};
use std::fmt;

/// 書籍ID。1始まりの正の整数で、ストアのキーは10進文字列。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(u64);

impl BookId {
    /// 空のカタログで最初に割り当てるID
    pub const FIRST: BookId = BookId(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// 次のID（+1）。u64 の上限を超える場合は None。
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// ドキュメントストアのキー
    pub fn key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BookId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse::<u64>().map(Self)
    }
}
