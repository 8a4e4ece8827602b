//! Per-task status reports

use appraise_common::db::{EvaluationStore, LucyRanking, SystemSlot, Task, TaskFamily};
use appraise_common::human_time::format_duration_opt;
use appraise_common::{LucyDistribution, QualityShare, Result, TaskStatus};
use serde::Serialize;

/// Average rank per system slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankAverages {
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub c: Option<f64>,
    pub d: Option<f64>,
}

/// Family-specific statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FamilyStats {
    Ranking {
        average_rank: RankAverages,
    },
    Editing {
        results: usize,
    },
    Lucy {
        distribution: LucyDistribution,
    },
    Quality {
        acceptable: QualityShare,
        can_be_fixed: QualityShare,
        none_of_both: QualityShare,
        average_duration: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskReport {
    pub id: i64,
    pub task_id: String,
    pub family: TaskFamily,
    pub shortname: String,
    pub status: TaskStatus,
    pub completed: bool,
    pub stats: FamilyStats,
}

/// Load one task's snapshot and aggregate it
pub async fn build_report<S>(store: &S, task: &Task) -> Result<TaskReport>
where
    S: EvaluationStore + ?Sized,
{
    let (status, stats) = match task.family {
        TaskFamily::Ranking => {
            let snapshot = store.ranking_snapshot(task.id).await?;
            let average_rank = RankAverages {
                a: snapshot.average_rank(SystemSlot::A),
                b: snapshot.average_rank(SystemSlot::B),
                c: snapshot.average_rank(SystemSlot::C),
                d: snapshot.average_rank(SystemSlot::D),
            };
            (snapshot.status(), FamilyStats::Ranking { average_rank })
        }
        TaskFamily::Editing => {
            let snapshot = store.editing_snapshot(task.id).await?;
            let results = snapshot.items.iter().map(|item| item.results.len()).sum();
            (snapshot.status(), FamilyStats::Editing { results })
        }
        TaskFamily::Lucy => {
            let snapshot = store.lucy_snapshot(task.id).await?;
            let distribution = snapshot.lucy_distribution();
            (snapshot.status(), FamilyStats::Lucy { distribution })
        }
        TaskFamily::Quality => {
            let snapshot = store.quality_snapshot(task.id).await?;
            let stats = FamilyStats::Quality {
                acceptable: snapshot.acceptable(),
                can_be_fixed: snapshot.can_be_fixed(),
                none_of_both: snapshot.none_of_both(),
                average_duration: snapshot.average_duration(),
            };
            (snapshot.status(), stats)
        }
    };

    Ok(TaskReport {
        id: task.id,
        task_id: task.task_id.to_string(),
        family: task.family,
        shortname: task.shortname.clone(),
        status,
        completed: status.completed(),
        stats,
    })
}

fn format_rank(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

fn format_share(share: &QualityShare) -> String {
    format!("{} ({:.1}%)", share.count, share.percentage)
}

impl TaskReport {
    /// One-line text rendering
    pub fn render_line(&self) -> String {
        let head = format!(
            "{:<8} {:<24} {}/{} {}",
            self.family.as_str(),
            self.shortname,
            self.status.edited,
            self.status.total,
            if self.completed { "complete" } else { "open" }
        );

        let detail = match &self.stats {
            FamilyStats::Ranking { average_rank } => format!(
                "avg rank A={} B={} C={} D={}",
                format_rank(average_rank.a),
                format_rank(average_rank.b),
                format_rank(average_rank.c),
                format_rank(average_rank.d)
            ),
            FamilyStats::Editing { results } => format!("{} post-edits", results),
            FamilyStats::Lucy { distribution } => {
                let buckets: Vec<String> = LucyRanking::ALL
                    .iter()
                    .map(|label| format!("{}={}", label.as_str(), distribution.count(*label)))
                    .collect();
                format!("{} total={}", buckets.join(" "), distribution.total)
            }
            FamilyStats::Quality {
                acceptable,
                can_be_fixed,
                none_of_both,
                average_duration,
            } => format!(
                "A={} C={} N={} avg time {}",
                format_share(acceptable),
                format_share(can_be_fixed),
                format_share(none_of_both),
                format_duration_opt(*average_duration)
            ),
        };

        format!("{}  {}  [{}]", head, detail, self.task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraise_common::db::{
        NewLucyItem, NewLucyResult, NewQualityItem, NewQualityResult, NewTask, QualityLabel,
        SqliteStore,
    };
    use chrono::NaiveTime;

    #[tokio::test]
    async fn test_empty_ranking_task_report() {
        let store = SqliteStore::in_memory().await.unwrap();
        let task = store
            .create_task(NewTask::new(TaskFamily::Ranking, "empty"))
            .await
            .unwrap();

        let report = build_report(&store, &task).await.unwrap();

        assert_eq!(report.status, TaskStatus { edited: 0, total: 0 });
        assert!(report.completed);
        assert_eq!(
            report.stats,
            FamilyStats::Ranking {
                average_rank: RankAverages {
                    a: None,
                    b: None,
                    c: None,
                    d: None
                }
            }
        );
        let line = report.render_line();
        assert!(line.contains("0/0 complete"), "{}", line);
        assert!(line.contains("A=- B=- C=- D=-"), "{}", line);
    }

    #[tokio::test]
    async fn test_lucy_report_counts_every_result() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store.create_user("rater").await.unwrap();
        let task = store
            .create_task(NewTask::new(TaskFamily::Lucy, "lucy"))
            .await
            .unwrap();
        let item = store
            .add_lucy_item(task.id, NewLucyItem::default())
            .await
            .unwrap();
        for ranking in [LucyRanking::Better, LucyRanking::Better, LucyRanking::MuchWorse] {
            store
                .submit_lucy_result(NewLucyResult {
                    item: item.id,
                    user: user.id,
                    ranking,
                })
                .await
                .unwrap();
        }

        let report = build_report(&store, &task).await.unwrap();

        assert_eq!(report.status, TaskStatus { edited: 0, total: 1 });
        assert!(!report.completed);
        let line = report.render_line();
        assert!(line.contains("W++=1 W+=0 ===0 B+=2 B++=0 total=3"), "{}", line);
    }

    #[tokio::test]
    async fn test_quality_report_json() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store.create_user("rater").await.unwrap();
        let task = store
            .create_task(NewTask::new(TaskFamily::Quality, "quality"))
            .await
            .unwrap();
        let item = store
            .add_quality_item(task.id, NewQualityItem::default())
            .await
            .unwrap();
        store
            .submit_quality_result(NewQualityResult {
                item: item.id,
                user: user.id,
                quality: QualityLabel::Acceptable,
                duration: NaiveTime::from_hms_opt(0, 0, 30),
            })
            .await
            .unwrap();
        store
            .set_item_edited(TaskFamily::Quality, item.id, true)
            .await
            .unwrap();

        let report = build_report(&store, &task).await.unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["family"], "quality");
        assert_eq!(json["completed"], true);
        assert_eq!(json["status"]["edited"], 1);
        assert_eq!(json["stats"]["acceptable"]["count"], 1);
        assert_eq!(json["stats"]["acceptable"]["percentage"], 100.0);
        assert_eq!(json["stats"]["average_duration"], 30.0);
        assert!(report.render_line().contains("avg time 30.00s"));
    }
}
