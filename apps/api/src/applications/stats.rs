//! Per-user summary statistics over applications.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::application::ApplicationStatus;
use crate::store::{ApplicationStore, CompanyCount, StatusCount};

/// Applications created at or after `now - RECENT_WINDOW_DAYS` count as recent.
pub const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StatusBreakdown {
    pub success: i64,
    pub failed: i64,
    pub pending: i64,
}

impl StatusBreakdown {
    /// Folds grouped rows; statuses outside the enum are ignored.
    pub fn from_counts(counts: &[StatusCount]) -> Self {
        let mut breakdown = StatusBreakdown::default();
        for row in counts {
            match row.status.parse::<ApplicationStatus>() {
                Ok(ApplicationStatus::Success) => breakdown.success += row.count,
                Ok(ApplicationStatus::Failed) => breakdown.failed += row.count,
                Ok(ApplicationStatus::Pending) => breakdown.pending += row.count,
                Err(_) => {}
            }
        }
        breakdown
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompanyStat {
    pub company: String,
    pub count: i64,
}

impl From<CompanyCount> for CompanyStat {
    fn from(row: CompanyCount) -> Self {
        CompanyStat {
            company: row.company,
            count: row.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStats {
    pub total: i64,
    pub by_status: StatusBreakdown,
    pub success_rate: i64,
    pub recent: i64,
    pub by_company: Vec<CompanyStat>,
}

/// `round(success / (success + failed) * 100)`, 0 when nothing has completed.
/// Pending applications are not part of the denominator. Halves round up.
pub fn success_rate(success: i64, failed: i64) -> i64 {
    let completed = success + failed;
    if completed <= 0 {
        return 0;
    }
    (success * 200 + completed) / (2 * completed)
}

/// Runs the sub-queries concurrently. Any failure fails the whole result so a
/// dashboard never mixes real numbers with defaults.
pub async fn compute_stats<S: ApplicationStore + ?Sized>(
    store: &S,
    caller: &Caller,
    now: DateTime<Utc>,
) -> Result<ApplicationStats, AppError> {
    let user_id = caller.user_id.as_str();
    let since = now - Duration::days(RECENT_WINDOW_DAYS);

    let (total, by_status, recent, by_company) = tokio::try_join!(
        store.count_applications(user_id),
        store.count_by_status(user_id),
        store.count_created_since(user_id, since),
        store.count_by_company(user_id),
    )?;

    let by_status = StatusBreakdown::from_counts(&by_status);
    Ok(ApplicationStats {
        total,
        success_rate: success_rate(by_status.success, by_status.failed),
        by_status,
        recent,
        by_company: by_company.into_iter().map(CompanyStat::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::NewApplication;
    use crate::models::job::NewJob;
    use crate::store::{JobStore, MemoryStore};

    #[test]
    fn test_success_rate_rounds() {
        assert_eq!(success_rate(2, 1), 67);
        assert_eq!(success_rate(1, 2), 33);
        assert_eq!(success_rate(1, 1), 50);
        assert_eq!(success_rate(1, 7), 13);
        assert_eq!(success_rate(3, 0), 100);
    }

    #[test]
    fn test_success_rate_without_completed_is_zero() {
        assert_eq!(success_rate(0, 0), 0);
    }

    async fn seed(store: &MemoryStore, user: &str, rows: &[(&str, Option<&str>)]) -> Vec<i64> {
        let jobs = store
            .insert_jobs(
                user,
                vec![NewJob {
                    title: "Engineer".into(),
                    company: "Acme".into(),
                    location: None,
                    salary: None,
                    job_type: None,
                    description: None,
                    skills: None,
                    website: None,
                    posted: None,
                }],
            )
            .await
            .unwrap();
        let mut ids = Vec::new();
        for (status, company) in rows {
            let row = store
                .insert_application(
                    user,
                    NewApplication {
                        job_id: jobs[0].id,
                        job_title: Some("Engineer".into()),
                        company: company.map(String::from),
                        status: status.parse().unwrap(),
                        applied_at: None,
                        website: None,
                    },
                )
                .await
                .unwrap()
                .unwrap();
            ids.push(row.id);
        }
        ids
    }

    fn caller(id: &str) -> Caller {
        Caller {
            user_id: id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_stats_for_mixed_statuses() {
        let store = MemoryStore::new();
        seed(
            &store,
            "alice",
            &[
                ("success", Some("TCS")),
                ("success", Some("Infosys")),
                ("failed", Some("TCS")),
            ],
        )
        .await;
        seed(&store, "bob", &[("failed", Some("Wipro"))]).await;

        let stats = compute_stats(&store, &caller("alice"), Utc::now()).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(
            stats.by_status,
            StatusBreakdown {
                success: 2,
                failed: 1,
                pending: 0
            }
        );
        assert_eq!(stats.success_rate, 67);
        assert_eq!(stats.recent, 3);
        assert_eq!(
            stats.by_company,
            vec![
                CompanyStat {
                    company: "TCS".into(),
                    count: 2
                },
                CompanyStat {
                    company: "Infosys".into(),
                    count: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_stats_with_no_applications() {
        let store = MemoryStore::new();
        let stats = compute_stats(&store, &caller("alice"), Utc::now()).await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.success_rate, 0);
        assert_eq!(stats.by_status, StatusBreakdown::default());
        assert!(stats.by_company.is_empty());
    }

    #[tokio::test]
    async fn test_pending_excluded_from_rate_and_blank_company_omitted() {
        let store = MemoryStore::new();
        seed(
            &store,
            "alice",
            &[("pending", None), ("pending", Some("")), ("success", Some("TCS"))],
        )
        .await;
        let stats = compute_stats(&store, &caller("alice"), Utc::now()).await.unwrap();
        assert_eq!(stats.success_rate, 100);
        assert_eq!(stats.by_status.pending, 2);
        assert_eq!(stats.by_company.len(), 1);
    }

    #[tokio::test]
    async fn test_recent_window_boundary_is_inclusive() {
        let store = MemoryStore::new();
        let ids = seed(
            &store,
            "alice",
            &[("success", None), ("success", None), ("failed", None)],
        )
        .await;
        let now = Utc::now();
        let boundary = now - Duration::days(RECENT_WINDOW_DAYS);
        store.backdate_application(ids[0], boundary).await;
        store
            .backdate_application(ids[1], boundary - Duration::seconds(1))
            .await;

        let stats = compute_stats(&store, &caller("alice"), now).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.recent, 2);
    }
}
