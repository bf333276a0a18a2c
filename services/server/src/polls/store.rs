//! 投票存储：投票定义、计票与“每人每票一次”约束。
//!
//! 整个集合由一把 `RwLock` 保护：读取共享，创建与投票独占，
//! 因此“检查是否已投 → 计票 → 记录投票人”在同一临界区内完成。

use std::collections::{BTreeMap, BTreeSet};

use poll_protocol::{PollView, now_rfc3339_nanos};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

/// 投票 ID。
pub(crate) type PollId = u64;

/// 投票查询/创建错误。
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum PollError {
    #[error("poll not found")]
    NotFound,
    #[error("a poll needs at least one option")]
    InvalidPoll,
}

/// 投票动作错误，按检查顺序排列。
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum VoteError {
    #[error("poll not found")]
    NotFound,
    #[error("already voted")]
    AlreadyVoted,
    #[error("invalid option index")]
    InvalidOption,
}

/// 单个投票。
#[derive(Debug, Clone)]
pub(crate) struct Poll {
    pub(crate) id: PollId,
    pub(crate) question: String,
    pub(crate) options: Vec<String>,
    /// 与 `options` 等长。
    pub(crate) votes: Vec<u64>,
    pub(crate) voted_users: BTreeSet<String>,
    pub(crate) creator_email: String,
    pub(crate) created_at: String,
}

impl Poll {
    /// 转为接口输出结构。
    pub(crate) fn to_view(&self) -> PollView {
        PollView {
            id: self.id,
            question: self.question.clone(),
            options: self.options.clone(),
            votes: self.votes.clone(),
            voted_users: self.voted_users.iter().cloned().collect(),
            creator_email: self.creator_email.clone(),
            created_at: self.created_at.clone(),
        }
    }

    pub(crate) fn total_votes(&self) -> u64 {
        self.votes.iter().sum()
    }
}

/// 锁内数据：投票表与下一个可用 ID。
struct PollBook {
    next_id: PollId,
    polls: BTreeMap<PollId, Poll>,
}

/// 内存投票存储。
pub(crate) struct PollStore {
    book: RwLock<PollBook>,
}

impl Default for PollStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PollStore {
    pub(crate) fn new() -> Self {
        Self {
            book: RwLock::new(PollBook {
                next_id: 1,
                polls: BTreeMap::new(),
            }),
        }
    }

    /// 创建投票，返回新 ID；选项列表不能为空。
    pub(crate) async fn create(
        &self,
        question: String,
        options: Vec<String>,
        creator_email: &str,
    ) -> Result<PollId, PollError> {
        if options.is_empty() {
            return Err(PollError::InvalidPoll);
        }

        let mut book = self.book.write().await;
        let id = book.next_id;
        book.next_id += 1;
        let poll = Poll {
            id,
            question,
            votes: vec![0; options.len()],
            options,
            voted_users: BTreeSet::new(),
            creator_email: creator_email.to_string(),
            created_at: now_rfc3339_nanos(),
        };
        info!(poll_id = id, options = poll.options.len(), "poll created");
        book.polls.insert(id, poll);
        Ok(id)
    }

    /// 全部投票快照，按 ID 升序。
    pub(crate) async fn list(&self) -> Vec<Poll> {
        self.book.read().await.polls.values().cloned().collect()
    }

    pub(crate) async fn get(&self, id: PollId) -> Result<Poll, PollError> {
        self.book
            .read()
            .await
            .polls
            .get(&id)
            .cloned()
            .ok_or(PollError::NotFound)
    }

    /// 投票：同一邮箱对同一投票只能成功一次。
    pub(crate) async fn vote(
        &self,
        poll_id: PollId,
        option_index: i64,
        voter_email: &str,
    ) -> Result<(), VoteError> {
        let mut book = self.book.write().await;
        let Some(poll) = book.polls.get_mut(&poll_id) else {
            return Err(VoteError::NotFound);
        };
        if poll.voted_users.contains(voter_email) {
            return Err(VoteError::AlreadyVoted);
        }
        let Some(index) = usize::try_from(option_index)
            .ok()
            .filter(|index| *index < poll.options.len())
        else {
            return Err(VoteError::InvalidOption);
        };

        poll.votes[index] += 1;
        poll.voted_users.insert(voter_email.to_string());
        info!(
            poll_id,
            option_index = index,
            total = poll.total_votes(),
            "vote recorded"
        );
        Ok(())
    }
}
