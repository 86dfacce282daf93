// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! File-backed store
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/memory.jsonl                  one JSON record per line, append only
//! <root>/snapshots/run-<r>-<s>.hbckp   checkpoint bytes referenced by snapshot records
//! ```
//!
//! The log is replayed on open so the in-memory indexes and id counters resume
//! where the previous process left off. A malformed line (typically a torn
//! final write) is skipped with a warning.

use crate::backend::PersistenceBackend;
use crate::records::{
    GoalEdge, GoalNode, GoalNodeId, GoalStatus, LearningStatsRecord, NewGoal, RunId, RunRecord,
    SnapshotId, SnapshotRecord,
};
use crate::{now_millis, Result, StateError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const LOG_FILE: &str = "memory.jsonl";
const SNAPSHOT_DIR: &str = "snapshots";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum LogRecord {
    Run(RunRecord),
    RunEnded { id: RunId, ended_at: i64 },
    LearningStats(LearningStatsRecord),
    GoalNode(GoalNode),
    GoalStatus { id: GoalNodeId, status: GoalStatus },
    GoalEdge(GoalEdge),
    Snapshot(SnapshotRecord),
}

/// JSON-lines backed [`PersistenceBackend`]
pub struct MemoryDb {
    root: PathBuf,
    log: BufWriter<File>,
    runs: BTreeMap<RunId, RunRecord>,
    learning_stats: Vec<LearningStatsRecord>,
    goals: BTreeMap<GoalNodeId, GoalNode>,
    goal_edges: Vec<GoalEdge>,
    snapshots: BTreeMap<SnapshotId, SnapshotRecord>,
    next_run_id: u64,
    next_goal_id: u64,
    next_snapshot_id: u64,
}

impl MemoryDb {
    /// Open (or create) a store rooted at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let open_failed = |e: std::io::Error| StateError::OpenFailed {
            path: root.clone(),
            reason: e.to_string(),
        };

        std::fs::create_dir_all(root.join(SNAPSHOT_DIR)).map_err(open_failed)?;

        let log_path = root.join(LOG_FILE);
        let mut db = Self {
            root: root.clone(),
            log: BufWriter::new(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&log_path)
                    .map_err(open_failed)?,
            ),
            runs: BTreeMap::new(),
            learning_stats: Vec::new(),
            goals: BTreeMap::new(),
            goal_edges: Vec::new(),
            snapshots: BTreeMap::new(),
            next_run_id: 0,
            next_goal_id: 0,
            next_snapshot_id: 0,
        };
        let replayed = db.replay(&log_path).map_err(open_failed)?;
        if !ends_with_newline(&log_path).map_err(open_failed)? {
            // Terminate a torn final record so the next append starts on a fresh line
            db.log.write_all(b"\n").map_err(open_failed)?;
            db.log.flush().map_err(open_failed)?;
        }

        info!(
            target: "hyperbrain-state-manager",
            "Opened memory store at {} ({} records replayed, {} runs)",
            root.display(),
            replayed,
            db.runs.len()
        );
        Ok(db)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runs(&self) -> impl Iterator<Item = &RunRecord> {
        self.runs.values()
    }

    pub fn run(&self, id: RunId) -> Option<&RunRecord> {
        self.runs.get(&id)
    }

    fn replay(&mut self, log_path: &Path) -> std::io::Result<usize> {
        let reader = BufReader::new(File::open(log_path)?);
        let mut applied = 0;
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LogRecord>(&line) {
                Ok(record) => {
                    self.apply(record);
                    applied += 1;
                }
                Err(e) => warn!(
                    target: "hyperbrain-state-manager",
                    "Skipping malformed record at {}:{}: {}",
                    log_path.display(),
                    line_no + 1,
                    e
                ),
            }
        }
        Ok(applied)
    }

    /// Fold a record into the in-memory indexes and advance id counters
    fn apply(&mut self, record: LogRecord) {
        match record {
            LogRecord::Run(run) => {
                self.next_run_id = self.next_run_id.max(run.id.0 + 1);
                self.runs.insert(run.id, run);
            }
            LogRecord::RunEnded { id, ended_at } => {
                if let Some(run) = self.runs.get_mut(&id) {
                    run.ended_at = Some(ended_at);
                }
            }
            LogRecord::LearningStats(stats) => self.learning_stats.push(stats),
            LogRecord::GoalNode(goal) => {
                self.next_goal_id = self.next_goal_id.max(goal.id.0 + 1);
                self.goals.insert(goal.id, goal);
            }
            LogRecord::GoalStatus { id, status } => {
                if let Some(goal) = self.goals.get_mut(&id) {
                    goal.status = status;
                }
            }
            LogRecord::GoalEdge(edge) => self.goal_edges.push(edge),
            LogRecord::Snapshot(snapshot) => {
                self.next_snapshot_id = self.next_snapshot_id.max(snapshot.id.0 + 1);
                self.snapshots.insert(snapshot.id, snapshot);
            }
        }
    }

    /// Write a record durably, then apply it
    fn append(&mut self, record: LogRecord) -> Result<()> {
        serde_json::to_writer(&mut self.log, &record)?;
        self.log.write_all(b"\n")?;
        self.log.flush()?;
        self.apply(record);
        Ok(())
    }

    fn require_run(&self, run: RunId) -> Result<()> {
        if self.runs.contains_key(&run) {
            Ok(())
        } else {
            Err(StateError::NotFound {
                kind: "run",
                id: run.0,
            })
        }
    }

    fn require_goal(&self, goal: GoalNodeId) -> Result<()> {
        if self.goals.contains_key(&goal) {
            Ok(())
        } else {
            Err(StateError::NotFound {
                kind: "goal",
                id: goal.0,
            })
        }
    }
}

fn ends_with_newline(path: &Path) -> std::io::Result<bool> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

impl PersistenceBackend for MemoryDb {
    fn begin_run(&mut self, label: &str) -> Result<RunId> {
        let id = RunId(self.next_run_id);
        self.append(LogRecord::Run(RunRecord {
            id,
            label: label.to_string(),
            started_at: now_millis(),
            ended_at: None,
        }))?;
        debug!(target: "hyperbrain-state-manager", "Began {} ({})", id, label);
        Ok(id)
    }

    fn end_run(&mut self, run: RunId) -> Result<()> {
        self.require_run(run)?;
        self.append(LogRecord::RunEnded {
            id: run,
            ended_at: now_millis(),
        })
    }

    fn record_learning_stats(&mut self, record: LearningStatsRecord) -> Result<()> {
        self.require_run(record.run_id)?;
        self.append(LogRecord::LearningStats(record))
    }

    fn learning_stats(&self, run: RunId) -> Result<Vec<LearningStatsRecord>> {
        self.require_run(run)?;
        Ok(self
            .learning_stats
            .iter()
            .filter(|r| r.run_id == run)
            .cloned()
            .collect())
    }

    fn add_goal_node(&mut self, run: RunId, goal: NewGoal) -> Result<GoalNodeId> {
        self.require_run(run)?;
        let id = GoalNodeId(self.next_goal_id);
        self.append(LogRecord::GoalNode(GoalNode {
            id,
            run_id: run,
            label: goal.label,
            target_region: goal.target_region,
            intensity: goal.intensity,
            success_threshold: goal.success_threshold,
            status: GoalStatus::Pending,
            created_at: now_millis(),
        }))?;
        Ok(id)
    }

    fn set_goal_status(&mut self, goal: GoalNodeId, status: GoalStatus) -> Result<()> {
        self.require_goal(goal)?;
        self.append(LogRecord::GoalStatus { id: goal, status })
    }

    fn add_goal_edge(&mut self, edge: GoalEdge) -> Result<()> {
        self.require_run(edge.run_id)?;
        self.require_goal(edge.from)?;
        self.require_goal(edge.to)?;
        self.append(LogRecord::GoalEdge(edge))
    }

    fn goal_nodes(&self, run: RunId) -> Result<Vec<GoalNode>> {
        self.require_run(run)?;
        Ok(self
            .goals
            .values()
            .filter(|g| g.run_id == run)
            .cloned()
            .collect())
    }

    fn goal_edges(&self, run: RunId) -> Result<Vec<GoalEdge>> {
        self.require_run(run)?;
        Ok(self
            .goal_edges
            .iter()
            .filter(|e| e.run_id == run)
            .cloned()
            .collect())
    }

    fn store_snapshot(
        &mut self,
        run: RunId,
        tick: u64,
        description: &str,
        bytes: &[u8],
    ) -> Result<SnapshotRecord> {
        self.require_run(run)?;
        let id = SnapshotId(self.next_snapshot_id);
        let path = self
            .root
            .join(SNAPSHOT_DIR)
            .join(format!("run-{}-{}.hbckp", run.0, id.0));
        std::fs::write(&path, bytes)?;

        let record = SnapshotRecord {
            id,
            run_id: run,
            tick,
            description: description.to_string(),
            path,
            size_bytes: bytes.len() as u64,
            created_at: now_millis(),
        };
        self.append(LogRecord::Snapshot(record.clone()))?;
        info!(
            target: "hyperbrain-state-manager",
            "Stored {} for {} at tick {} ({} bytes)",
            id,
            run,
            tick,
            record.size_bytes
        );
        Ok(record)
    }

    fn snapshots(&self, run: RunId) -> Result<Vec<SnapshotRecord>> {
        self.require_run(run)?;
        Ok(self
            .snapshots
            .values()
            .filter(|s| s.run_id == run)
            .cloned()
            .collect())
    }

    fn load_snapshot(&self, snapshot: SnapshotId) -> Result<Vec<u8>> {
        let record = self.snapshots.get(&snapshot).ok_or(StateError::NotFound {
            kind: "snapshot",
            id: snapshot.0,
        })?;
        Ok(std::fs::read(&record.path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn goal(label: &str) -> NewGoal {
        NewGoal {
            label: label.to_string(),
            target_region: Some("motor".to_string()),
            intensity: 0.5,
            success_threshold: 0.8,
        }
    }

    #[test]
    fn test_replay_resumes_ids() {
        let dir = tempdir().unwrap();
        let first = {
            let mut db = MemoryDb::open(dir.path()).unwrap();
            let run = db.begin_run("first").unwrap();
            db.add_goal_node(run, goal("reach")).unwrap();
            run
        };

        let mut db = MemoryDb::open(dir.path()).unwrap();
        assert_eq!(db.run(first).map(|r| r.label.as_str()), Some("first"));
        let second = db.begin_run("second").unwrap();
        assert_eq!(second, RunId(first.0 + 1));
        let next_goal = db.add_goal_node(second, goal("grasp")).unwrap();
        assert_eq!(next_goal, GoalNodeId(1));
    }

    #[test]
    fn test_goal_graph_queries() {
        let dir = tempdir().unwrap();
        let mut db = MemoryDb::open(dir.path()).unwrap();
        let run = db.begin_run("goals").unwrap();
        let parent = db.add_goal_node(run, goal("explore")).unwrap();
        let child = db.add_goal_node(run, goal("look")).unwrap();
        db.add_goal_edge(GoalEdge {
            run_id: run,
            from: child,
            to: parent,
            relation: "subgoal_of".to_string(),
            weight: 1.0,
        })
        .unwrap();
        db.set_goal_status(child, GoalStatus::Achieved).unwrap();

        let nodes = db.goal_nodes(run).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].status, GoalStatus::Achieved);
        assert_eq!(db.goal_edges(run).unwrap().len(), 1);
    }

    #[test]
    fn test_edge_to_unknown_goal_rejected() {
        let dir = tempdir().unwrap();
        let mut db = MemoryDb::open(dir.path()).unwrap();
        let run = db.begin_run("edges").unwrap();
        let known = db.add_goal_node(run, goal("a")).unwrap();
        let result = db.add_goal_edge(GoalEdge {
            run_id: run,
            from: known,
            to: GoalNodeId(99),
            relation: "follows".to_string(),
            weight: 0.5,
        });
        assert!(matches!(result, Err(StateError::NotFound { kind: "goal", id: 99 })));
    }

    #[test]
    fn test_snapshot_bytes_roundtrip() {
        let dir = tempdir().unwrap();
        let mut db = MemoryDb::open(dir.path()).unwrap();
        let run = db.begin_run("snap").unwrap();
        let record = db.store_snapshot(run, 12, "tick 12", &[9, 8, 7]).unwrap();
        assert_eq!(record.size_bytes, 3);
        assert_eq!(db.load_snapshot(record.id).unwrap(), vec![9, 8, 7]);
        assert_eq!(db.snapshots(run).unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_line_skipped() {
        let dir = tempdir().unwrap();
        {
            let mut db = MemoryDb::open(dir.path()).unwrap();
            db.begin_run("ok").unwrap();
        }
        let mut log = OpenOptions::new()
            .append(true)
            .open(dir.path().join(LOG_FILE))
            .unwrap();
        log.write_all(b"{\"record\":\"run\",\"id\":").unwrap();

        let mut db = MemoryDb::open(dir.path()).unwrap();
        assert_eq!(db.runs().count(), 1);
        let next = db.begin_run("after torn write").unwrap();

        let db = MemoryDb::open(dir.path()).unwrap();
        assert_eq!(db.run(next).map(|r| r.label.as_str()), Some("after torn write"));
    }

    #[test]
    fn test_open_under_a_file_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = MemoryDb::open(file.path().join("store"));
        assert!(matches!(result, Err(StateError::OpenFailed { .. })));
    }
}
