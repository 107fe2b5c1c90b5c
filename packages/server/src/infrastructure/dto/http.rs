//! HTTP API response DTOs.

use hiroba_shared::time::timestamp_to_rfc3339;
use serde::{Deserialize, Serialize};

use crate::domain::{RoomSummary, Username};

/// `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub rooms: usize,
}

/// One entry of `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub name: String,
    pub member_count: usize,
    pub message_count: u64,
    pub created_at: String,
}

/// `GET /api/rooms/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub name: String,
    pub members: Vec<String>,
    pub message_index: u64,
    pub created_at: String,
}

impl From<RoomSummary> for RoomSummaryDto {
    fn from(summary: RoomSummary) -> Self {
        Self {
            name: summary.name.as_str().to_string(),
            member_count: summary.member_count,
            message_count: summary.message_count,
            created_at: timestamp_to_rfc3339(summary.created_at.value()),
        }
    }
}

impl RoomDetailDto {
    pub fn new(summary: RoomSummary, members: Vec<Username>) -> Self {
        Self {
            name: summary.name.as_str().to_string(),
            members: members.into_iter().map(Username::into_string).collect(),
            message_index: summary.message_count,
            created_at: timestamp_to_rfc3339(summary.created_at.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoomName, Timestamp};

    fn summary() -> RoomSummary {
        RoomSummary {
            name: RoomName::new("general".to_string()).unwrap(),
            member_count: 2,
            message_count: 5,
            created_at: Timestamp::new(1672498800000),
        }
    }

    #[test]
    fn test_room_summary_to_dto() {
        // テスト項目: ルーム概要が DTO に変換される
        // given (前提条件):
        let summary = summary();

        // when (操作):
        let dto = RoomSummaryDto::from(summary);

        // then (期待する結果):
        assert_eq!(dto.name, "general");
        assert_eq!(dto.member_count, 2);
        assert_eq!(dto.message_count, 5);
        assert_eq!(dto.created_at, "2022-12-31T15:00:00.000Z");
    }

    #[test]
    fn test_room_detail_lists_member_names() {
        // テスト項目: ルーム詳細 DTO に参加者名とメッセージインデックスが含まれる
        // given (前提条件):
        let members = vec![
            Username::new("alice".to_string()).unwrap(),
            Username::new("bob".to_string()).unwrap(),
        ];

        // when (操作):
        let dto = RoomDetailDto::new(summary(), members);

        // then (期待する結果):
        assert_eq!(dto.members, vec!["alice", "bob"]);
        assert_eq!(dto.message_index, 5);
    }
}
