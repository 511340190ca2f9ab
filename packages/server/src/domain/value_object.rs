//! Value objects for the chat domain.

use std::{fmt, time::Duration};

use rand::{Rng, seq::SliceRandom};
use uuid::Uuid;

use super::ValueObjectError;

const ROOM_ID_SEGMENTS: [usize; 3] = [3, 4, 3];
const ROOM_LINK_HASH_KEY: &str = "?hs=";
const ROOM_LINK_HASH_RANGE: std::ops::RangeInclusive<u16> = 100..=999;

const NICKNAME_ADJECTIVES: [&str; 7] = [
    "Happy", "Sleepy", "Grumpy", "Sneezy", "Bashful", "Dopey", "Doc",
];
const NICKNAME_NOUNS: [&str; 7] = [
    "Panda", "Koala", "Penguin", "Tiger", "Lion", "Elephant", "Giraffe",
];

// ========================================
// RoomId
// ========================================

/// Registry key of a room: `xxx-xxxx-xxx` in lowercase ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if is_valid_room_id(&value) {
            Ok(Self(value))
        } else {
            Err(ValueObjectError::InvalidRoomId(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_room_id(value: &str) -> bool {
    let segments: Vec<&str> = value.split('-').collect();
    segments.len() == ROOM_ID_SEGMENTS.len()
        && segments
            .iter()
            .zip(ROOM_ID_SEGMENTS)
            .all(|(segment, len)| {
                segment.len() == len && segment.bytes().all(|b| b.is_ascii_lowercase())
            })
}

// ========================================
// RoomLink
// ========================================

/// Shareable room link handed out on room creation: `xxx-xxxx-xxx?hs=NNN`.
///
/// Only the [`RoomId`] part identifies the room; the `hs` number is
/// format-checked but not matched against anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomLink {
    room_id: RoomId,
    hash: u16,
}

impl RoomLink {
    pub fn new(room_id: RoomId, hash: u16) -> Result<Self, ValueObjectError> {
        if ROOM_LINK_HASH_RANGE.contains(&hash) {
            Ok(Self { room_id, hash })
        } else {
            Err(ValueObjectError::InvalidRoomLink(format!(
                "{}{}{}",
                room_id, ROOM_LINK_HASH_KEY, hash
            )))
        }
    }

    /// Parse a full link such as `abc-defg-hij?hs=123`
    pub fn parse(value: &str) -> Result<Self, ValueObjectError> {
        let invalid = || ValueObjectError::InvalidRoomLink(value.to_string());

        let (base, hash) = value.split_once(ROOM_LINK_HASH_KEY).ok_or_else(invalid)?;
        if hash.len() != 3 || !hash.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hash: u16 = hash.parse().map_err(|_| invalid())?;
        let room_id = RoomId::new(base.to_string()).map_err(|_| invalid())?;

        Self::new(room_id, hash).map_err(|_| invalid())
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn hash(&self) -> u16 {
        self.hash
    }
}

impl fmt::Display for RoomLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.room_id, ROOM_LINK_HASH_KEY, self.hash)
    }
}

/// Factory for random room links
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// Generate a random, well-formed room link
    ///
    /// Uniqueness against active rooms is the caller's responsibility.
    pub fn generate() -> RoomLink {
        let mut rng = rand::thread_rng();
        let base = ROOM_ID_SEGMENTS
            .iter()
            .map(|&len| {
                (0..len)
                    .map(|_| char::from(b'a' + rng.gen_range(0..26u8)))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("-");

        RoomLink {
            room_id: RoomId(base),
            hash: rng.gen_range(ROOM_LINK_HASH_RANGE),
        }
    }
}

// ========================================
// SessionId
// ========================================

/// Internal identity of one connected session (membership key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ========================================
// Nickname
// ========================================

/// Display name assigned to a session at connect time
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nickname(String);

impl Nickname {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyNickname);
        }
        Ok(Self(value))
    }

    /// e.g. `SleepyKoala042`
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let adjective = NICKNAME_ADJECTIVES.choose(&mut rng).unwrap_or(&"Happy");
        let noun = NICKNAME_NOUNS.choose(&mut rng).unwrap_or(&"Panda");
        let number: u16 = rng.gen_range(0..1000);
        Self(format!("{}{}{:03}", adjective, noun, number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ========================================
// Color
// ========================================

/// `#rrggbb` tag assigned to a session at connect time
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Color(String);

impl Color {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let valid = value.len() == 7
            && value.starts_with('#')
            && value[1..].bytes().all(|b| b.is_ascii_hexdigit());
        if valid {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(ValueObjectError::InvalidColor(value))
        }
    }

    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut channel = || rng.gen_range(0..=u8::MAX);
        Self(format!("#{:02x}{:02x}{:02x}", channel(), channel(), channel()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ========================================
// Timestamp
// ========================================

/// Unix timestamp in UTC milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Timestamp shifted forward by `duration`
    pub fn plus(&self, duration: Duration) -> Self {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(millis))
    }

    /// Age of this timestamp at `now`; zero when `now` is earlier (clock skew)
    pub fn age_at(&self, now: Timestamp) -> Duration {
        let millis = now.0.saturating_sub(self.0).max(0);
        Duration::from_millis(millis as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_accepts_valid_format() {
        // テスト項目: xxx-xxxx-xxx 形式の Room ID を受け付ける
        // given (前提条件):
        let value = "abc-defg-hij".to_string();

        // when (操作):
        let result = RoomId::new(value);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "abc-defg-hij");
    }

    #[test]
    fn test_room_id_rejects_invalid_formats() {
        // テスト項目: 形式が異なる Room ID は拒否される
        // given (前提条件):
        let invalid = [
            "",
            "abc-defg",
            "abc-defg-hijk",
            "ABC-defg-hij",
            "ab1-defg-hij",
            "abc-defg-hij-klm",
            "abc_defg_hij",
        ];

        for value in invalid {
            // when (操作):
            let result = RoomId::new(value.to_string());

            // then (期待する結果):
            assert_eq!(
                result,
                Err(ValueObjectError::InvalidRoomId(value.to_string())),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn test_room_link_parse_valid() {
        // テスト項目: 正しい形式の Room link をパースできる
        // given (前提条件):
        let value = "abc-defg-hij?hs=123";

        // when (操作):
        let link = RoomLink::parse(value).unwrap();

        // then (期待する結果):
        assert_eq!(link.room_id().as_str(), "abc-defg-hij");
        assert_eq!(link.hash(), 123);
        assert_eq!(link.to_string(), value);
    }

    #[test]
    fn test_room_link_parse_rejects_invalid() {
        // テスト項目: 不正な Room link は拒否される
        // given (前提条件):
        let invalid = [
            "abc-defg-hij",
            "abc-defg-hij?hs=",
            "abc-defg-hij?hs=099",
            "abc-defg-hij?hs=1000",
            "abc-defg-hij?hs=12a",
            "abc-defg-hij?hs=+12",
            "abc-defg-hi?hs=123",
            "abc-defg-hij?xx=123",
        ];

        for value in invalid {
            // when (操作):
            let result = RoomLink::parse(value);

            // then (期待する結果):
            assert!(
                matches!(result, Err(ValueObjectError::InvalidRoomLink(_))),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn test_room_id_factory_generates_valid_links() {
        // テスト項目: RoomIdFactory が生成する link は常にパース可能
        for _ in 0..100 {
            // when (操作):
            let link = RoomIdFactory::generate();

            // then (期待する結果):
            let parsed = RoomLink::parse(&link.to_string()).unwrap();
            assert_eq!(parsed, link);
        }
    }

    #[test]
    fn test_nickname_generate_format() {
        // テスト項目: 生成される nickname は 形容詞 + 名詞 + 3 桁の数字
        // when (操作):
        let nickname = Nickname::generate();

        // then (期待する結果):
        let value = nickname.as_str();
        let digits = &value[value.len() - 3..];
        assert!(digits.bytes().all(|b| b.is_ascii_digit()));
        assert!(NICKNAME_ADJECTIVES.iter().any(|a| value.starts_with(a)));
        assert!(NICKNAME_NOUNS
            .iter()
            .any(|n| value[..value.len() - 3].ends_with(n)));
    }

    #[test]
    fn test_nickname_rejects_empty() {
        // テスト項目: 空の nickname は拒否される
        assert_eq!(
            Nickname::new("  ".to_string()),
            Err(ValueObjectError::EmptyNickname)
        );
    }

    #[test]
    fn test_color_generate_is_valid() {
        // テスト項目: 生成される color は #rrggbb 形式
        // when (操作):
        let color = Color::generate();

        // then (期待する結果):
        assert_eq!(Color::new(color.as_str().to_string()), Ok(color));
    }

    #[test]
    fn test_color_rejects_invalid() {
        // テスト項目: 不正な color は拒否される
        assert!(Color::new("123456".to_string()).is_err());
        assert!(Color::new("#12345g".to_string()).is_err());
        assert!(Color::new("#1234567".to_string()).is_err());
    }

    #[test]
    fn test_timestamp_age_at() {
        // テスト項目: 経過時間が計算でき、未来の時刻は 0 になる
        // given (前提条件):
        let timestamp = Timestamp::new(10_000);

        // when (操作) / then (期待する結果):
        assert_eq!(
            timestamp.age_at(Timestamp::new(15_000)),
            Duration::from_secs(5)
        );
        assert_eq!(timestamp.age_at(Timestamp::new(5_000)), Duration::ZERO);
    }

    #[test]
    fn test_timestamp_plus() {
        // テスト項目: Duration を加算できる
        let timestamp = Timestamp::new(1_000);
        assert_eq!(
            timestamp.plus(Duration::from_secs(30 * 60)),
            Timestamp::new(1_000 + 30 * 60 * 1000)
        );
    }
}
