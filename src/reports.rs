use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::classify::{LeadPlatform, StatusClass};
use crate::jobs::NormalizedJob;

// ---------------------------------------------------------------------------
// Period filter
// ---------------------------------------------------------------------------

/// Dashboard time window. Year and Month mean the current calendar year and
/// month; Week runs from the most recent Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    Year,
    Month,
    Week,
}

impl Period {
    pub fn parse(raw: &str) -> Option<Period> {
        match raw.trim().to_lowercase().as_str() {
            "all" => Some(Self::All),
            "year" => Some(Self::Year),
            "month" => Some(Self::Month),
            "week" => Some(Self::Week),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All Time",
            Self::Year => "This Year",
            Self::Month => "This Month",
            Self::Week => "This Week",
        }
    }

    fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Year => date.year() == today.year(),
            Self::Month => date.year() == today.year() && date.month() == today.month(),
            Self::Week => {
                let week_start =
                    today - Duration::days(today.weekday().num_days_from_sunday() as i64);
                date >= week_start
            }
        }
    }
}

/// Keep the jobs that fall inside the period. Jobs without a parseable date
/// only survive the All filter.
pub fn filter_by_period(
    jobs: Vec<NormalizedJob>,
    period: Period,
    today: NaiveDate,
) -> Vec<NormalizedJob> {
    if period == Period::All {
        return jobs;
    }
    jobs.into_iter()
        .filter(|job| job.date.map_or(false, |d| period.contains(d, today)))
        .collect()
}

// ---------------------------------------------------------------------------
// Dashboard metrics
// ---------------------------------------------------------------------------

pub struct DashboardMetrics {
    /// Reconciled revenue over closed jobs only.
    pub total_revenue: f64,
    pub total_jobs: usize,
    pub completed_jobs: usize,
    pub cancelled_jobs: usize,
    pub active_jobs: usize,
    pub average_ticket: f64,
    /// Completed over total, as a percentage.
    pub conversion_rate: f64,
}

pub fn dashboard_metrics(jobs: &[NormalizedJob]) -> DashboardMetrics {
    let mut metrics = DashboardMetrics {
        total_revenue: 0.0,
        total_jobs: jobs.len(),
        completed_jobs: 0,
        cancelled_jobs: 0,
        active_jobs: 0,
        average_ticket: 0.0,
        conversion_rate: 0.0,
    };
    for job in jobs {
        match job.status_class {
            StatusClass::Closed => {
                metrics.completed_jobs += 1;
                metrics.total_revenue += job.reconciled_revenue;
            }
            StatusClass::Cancelled => metrics.cancelled_jobs += 1,
            StatusClass::Open => metrics.active_jobs += 1,
        }
    }
    if metrics.completed_jobs > 0 {
        metrics.average_ticket = metrics.total_revenue / metrics.completed_jobs as f64;
    }
    if metrics.total_jobs > 0 {
        metrics.conversion_rate = metrics.completed_jobs as f64 / metrics.total_jobs as f64 * 100.0;
    }
    metrics
}

// ---------------------------------------------------------------------------
// Monthly trend
// ---------------------------------------------------------------------------

pub struct MonthBucket {
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub jobs: usize,
    pub revenue: f64,
}

/// The trailing twelve calendar months ending with the current one, each with
/// its job count and closed revenue. Months with no jobs stay in the list.
pub fn monthly_trend(jobs: &[NormalizedJob], today: NaiveDate) -> Vec<MonthBucket> {
    let mut buckets: Vec<MonthBucket> = Vec::with_capacity(12);
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 0..12 {
        let label = NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_default();
        buckets.push(MonthBucket {
            label,
            year,
            month,
            jobs: 0,
            revenue: 0.0,
        });
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    buckets.reverse();

    for job in jobs {
        let Some(date) = job.date else { continue };
        let Some(bucket) = buckets
            .iter_mut()
            .find(|b| b.year == date.year() && b.month == date.month())
        else {
            continue;
        };
        bucket.jobs += 1;
        if job.status_class == StatusClass::Closed {
            bucket.revenue += job.reconciled_revenue;
        }
    }
    buckets
}

// ---------------------------------------------------------------------------
// Lead platform analytics
// ---------------------------------------------------------------------------

pub struct PlatformStat {
    pub platform: LeadPlatform,
    pub jobs: usize,
    pub revenue: f64,
}

/// Jobs and closed revenue per lead platform, biggest earners first.
pub fn lead_platform_stats(jobs: &[NormalizedJob]) -> Vec<PlatformStat> {
    let mut stats: Vec<PlatformStat> = Vec::new();
    let mut index: HashMap<LeadPlatform, usize> = HashMap::new();

    for job in jobs {
        let si = match index.get(&job.lead_platform) {
            Some(&i) => i,
            None => {
                stats.push(PlatformStat {
                    platform: job.lead_platform.clone(),
                    jobs: 0,
                    revenue: 0.0,
                });
                let i = stats.len() - 1;
                index.insert(job.lead_platform.clone(), i);
                i
            }
        };
        stats[si].jobs += 1;
        if job.status_class == StatusClass::Closed {
            stats[si].revenue += job.reconciled_revenue;
        }
    }

    stats.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.jobs.cmp(&a.jobs))
    });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::normalize;
    use crate::sheet::RawJob;

    fn njob(fields: &[(&str, &str)]) -> NormalizedJob {
        let mut raw = RawJob::new();
        for (k, v) in fields {
            raw.set(k, *v);
        }
        normalize(&raw)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_period_parse() {
        assert_eq!(Period::parse("all"), Some(Period::All));
        assert_eq!(Period::parse(" Month "), Some(Period::Month));
        assert_eq!(Period::parse("WEEK"), Some(Period::Week));
        assert_eq!(Period::parse("fortnight"), None);
    }

    #[test]
    fn test_period_filters_by_calendar_window() {
        // 2025-06-18 is a Wednesday; the week starts Sunday 2025-06-15
        let today = date("2025-06-18");
        let jobs = vec![
            njob(&[("Client Name", "A"), ("Date", "2025-06-16"), ("Status", "Closed")]),
            njob(&[("Client Name", "B"), ("Date", "2025-06-02"), ("Status", "Closed")]),
            njob(&[("Client Name", "C"), ("Date", "2025-01-10"), ("Status", "Closed")]),
            njob(&[("Client Name", "D"), ("Date", "2024-11-05"), ("Status", "Closed")]),
            njob(&[("Client Name", "E"), ("Status", "Closed")]),
        ];
        assert_eq!(filter_by_period(jobs.clone(), Period::All, today).len(), 5);
        assert_eq!(filter_by_period(jobs.clone(), Period::Year, today).len(), 3);
        assert_eq!(filter_by_period(jobs.clone(), Period::Month, today).len(), 2);
        assert_eq!(filter_by_period(jobs, Period::Week, today).len(), 1);
    }

    #[test]
    fn test_dashboard_metrics() {
        let jobs = vec![
            njob(&[("Client Name", "A"), ("Sales", "1000"), ("Status", "Closed")]),
            njob(&[("Client Name", "B"), ("Sales", "500"), ("Status", "Completed")]),
            njob(&[("Client Name", "C"), ("Sales", "900"), ("Status", "New Lead")]),
            njob(&[("Client Name", "D"), ("Sales", "400"), ("Status", "Cancelled")]),
        ];
        let metrics = dashboard_metrics(&jobs);
        assert_eq!(metrics.total_jobs, 4);
        assert_eq!(metrics.completed_jobs, 2);
        assert_eq!(metrics.active_jobs, 1);
        assert_eq!(metrics.cancelled_jobs, 1);
        assert_eq!(metrics.total_revenue, 1500.0);
        assert_eq!(metrics.average_ticket, 750.0);
        assert_eq!(metrics.conversion_rate, 50.0);
    }

    #[test]
    fn test_dashboard_metrics_empty() {
        let metrics = dashboard_metrics(&[]);
        assert_eq!(metrics.total_jobs, 0);
        assert_eq!(metrics.average_ticket, 0.0);
        assert_eq!(metrics.conversion_rate, 0.0);
    }

    #[test]
    fn test_metrics_use_reconciled_revenue() {
        // Recorded payments beat the Sales figure when they disagree
        let jobs = vec![njob(&[
            ("Client Name", "A"),
            ("Sales", "1000"),
            ("Cash", "$1,200.00"),
            ("Status", "Closed"),
        ])];
        let metrics = dashboard_metrics(&jobs);
        assert_eq!(metrics.total_revenue, 1200.0);
    }

    #[test]
    fn test_monthly_trend_buckets() {
        let today = date("2025-06-18");
        let jobs = vec![
            njob(&[("Client Name", "A"), ("Date", "2025-06-02"), ("Sales", "100"), ("Status", "Closed")]),
            njob(&[("Client Name", "B"), ("Date", "2025-06-20"), ("Sales", "50"), ("Status", "New Lead")]),
            njob(&[("Client Name", "C"), ("Date", "2024-07-04"), ("Sales", "900"), ("Status", "Closed")]),
            njob(&[("Client Name", "D"), ("Date", "2024-06-30"), ("Sales", "800"), ("Status", "Closed")]),
        ];
        let trend = monthly_trend(&jobs, today);
        assert_eq!(trend.len(), 12);
        assert_eq!(trend[0].label, "Jul 2024");
        assert_eq!(trend[11].label, "Jun 2025");
        assert_eq!(trend[11].jobs, 2);
        assert_eq!(trend[11].revenue, 100.0);
        assert_eq!(trend[0].jobs, 1);
        assert_eq!(trend[0].revenue, 900.0);
        // 2024-06 sits just outside the trailing window
        assert_eq!(trend.iter().map(|b| b.jobs).sum::<usize>(), 3);
    }

    #[test]
    fn test_lead_platform_stats() {
        let jobs = vec![
            njob(&[("Client Name", "A"), ("LP", "TT"), ("Sales", "500"), ("Status", "Closed")]),
            njob(&[("Client Name", "B"), ("LP", "TT"), ("Sales", "300"), ("Status", "New Lead")]),
            njob(&[("Client Name", "C"), ("LP", "GG"), ("Sales", "900"), ("Status", "Closed")]),
            njob(&[("Client Name", "D"), ("Sales", "100"), ("Status", "Closed")]),
        ];
        let stats = lead_platform_stats(&jobs);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].platform.label(), "Google");
        assert_eq!(stats[0].revenue, 900.0);
        let tt = stats
            .iter()
            .find(|s| s.platform == LeadPlatform::Thumbtack)
            .unwrap();
        assert_eq!(tt.jobs, 2);
        assert_eq!(tt.revenue, 500.0);
        let unknown = stats
            .iter()
            .find(|s| s.platform == LeadPlatform::Unknown)
            .unwrap();
        assert_eq!(unknown.jobs, 1);
        assert_eq!(unknown.revenue, 100.0);
    }

    #[test]
    fn test_lead_platform_keeps_unrecognized_codes() {
        let jobs = vec![njob(&[
            ("Client Name", "A"),
            ("LP", "Billboard"),
            ("Status", "Closed"),
            ("Sales", "75"),
        ])];
        let stats = lead_platform_stats(&jobs);
        assert_eq!(stats[0].platform.label(), "Billboard");
    }
}
