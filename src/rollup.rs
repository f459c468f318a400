use std::collections::HashMap;

use chrono::NaiveDate;

use crate::classify::StatusClass;
use crate::jobs::NormalizedJob;

// ---------------------------------------------------------------------------
// Customer / location grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Location {
    pub address: String,
    pub jobs: Vec<NormalizedJob>,
}

/// One customer aggregate. Identity is the raw client-name string: distinct
/// spellings are distinct customers, and blank names pool under
/// "Unknown Customer". Totals are accumulated during the fold, never by
/// re-scanning.
#[derive(Debug, Clone)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub customer_type: String,
    pub locations: Vec<Location>,
    pub total_revenue: f64,
    pub total_costs: f64,
    pub total_profit: f64,
    pub technician_payouts: f64,
    pub company_profit: f64,
    pub total_jobs: i64,
    pub completed_jobs: i64,
    pub cancelled_jobs: i64,
    pub first_job_date: Option<NaiveDate>,
    pub last_job_date: Option<NaiveDate>,
    pub tags: Vec<String>,
}

impl Customer {
    fn new(name: String) -> Self {
        Self {
            name,
            phone: String::new(),
            email: String::new(),
            customer_type: "residential".to_string(),
            locations: Vec::new(),
            total_revenue: 0.0,
            total_costs: 0.0,
            total_profit: 0.0,
            technician_payouts: 0.0,
            company_profit: 0.0,
            total_jobs: 0,
            completed_jobs: 0,
            cancelled_jobs: 0,
            first_job_date: None,
            last_job_date: None,
            tags: Vec::new(),
        }
    }
}

/// Tags are a pure function of the finished aggregate, applied after the
/// fold, not during it.
pub fn compute_tags(customer: &Customer) -> Vec<String> {
    let mut tags = Vec::new();
    if customer.total_revenue > 5000.0 {
        tags.push("High Value".to_string());
    }
    if customer.total_jobs > 3 {
        tags.push("Repeat Customer".to_string());
    }
    if customer.customer_type == "commercial" {
        tags.push("Commercial".to_string());
    }
    tags
}

/// Fold normalized jobs into customer -> location -> job in one left-to-right
/// pass. Only closed jobs move money; cancelled jobs only bump their counter;
/// everything bumps total_jobs. Customers come back sorted by last job date,
/// newest first.
pub fn customer_rollup(jobs: Vec<NormalizedJob>) -> Vec<Customer> {
    let mut customers: Vec<Customer> = Vec::new();
    let mut customer_index: HashMap<String, usize> = HashMap::new();
    let mut location_index: HashMap<(usize, String), usize> = HashMap::new();

    for job in jobs {
        let ci = match customer_index.get(&job.customer_key) {
            Some(&i) => i,
            None => {
                let mut customer = Customer::new(job.customer_key.clone());
                customer.phone = job.phone.clone();
                customer.email = job.email.clone();
                customers.push(customer);
                let i = customers.len() - 1;
                customer_index.insert(job.customer_key.clone(), i);
                i
            }
        };
        let customer = &mut customers[ci];

        customer.total_jobs += 1;
        match job.status_class {
            StatusClass::Closed => {
                customer.completed_jobs += 1;
                customer.total_revenue += job.reconciled_revenue;
                customer.total_costs += job.total_costs;
                customer.total_profit += job.gross_profit;
                customer.technician_payouts += job.technician_payout;
                customer.company_profit += job.company_profit;
            }
            StatusClass::Cancelled => {
                customer.cancelled_jobs += 1;
            }
            StatusClass::Open => {}
        }

        let li = match location_index.get(&(ci, job.address.clone())) {
            Some(&i) => i,
            None => {
                customer.locations.push(Location {
                    address: job.address.clone(),
                    jobs: Vec::new(),
                });
                let i = customer.locations.len() - 1;
                location_index.insert((ci, job.address.clone()), i);
                i
            }
        };
        customer.locations[li].jobs.push(job);
    }

    for customer in &mut customers {
        let mut dates: Vec<NaiveDate> = customer
            .locations
            .iter()
            .flat_map(|l| l.jobs.iter())
            .filter_map(|j| j.date)
            .collect();
        dates.sort();
        customer.first_job_date = dates.first().copied();
        customer.last_job_date = dates.last().copied();
        customer.tags = compute_tags(customer);
    }

    customers.sort_by(|a, b| match (a.last_job_date, b.last_job_date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    customers
}

// ---------------------------------------------------------------------------
// Technician attribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TechnicianStat {
    pub name: String,
    /// Fractional: a two-technician job counts 0.5 for each. Closed jobs only.
    pub total_jobs: f64,
    /// Whole count of open jobs naming this technician.
    pub active_jobs: i64,
    pub revenue: f64,
    pub costs: f64,
    pub profit: f64,
    pub commission: f64,
}

impl TechnicianStat {
    fn new(name: String) -> Self {
        Self {
            name,
            total_jobs: 0.0,
            active_jobs: 0,
            revenue: 0.0,
            costs: 0.0,
            profit: 0.0,
            commission: 0.0,
        }
    }
}

/// Second, independent pass over the same job set. Each job's value is split
/// evenly across its listed technicians (1/n of the count, amount/n of the
/// dollars), so technician totals sum back to the company-wide closed totals
/// whenever every closed job names at least one technician. A job with no
/// technicians contributes to nobody. Commission is each technician's
/// rostered rate applied to attributed revenue; unrostered names get
/// `default_rate`. Sorted by revenue descending.
pub fn technician_stats(
    jobs: &[NormalizedJob],
    rates: &HashMap<String, f64>,
    default_rate: f64,
) -> Vec<TechnicianStat> {
    let mut stats: Vec<TechnicianStat> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for job in jobs {
        let n = job.technician_names.len();
        if n == 0 {
            continue;
        }
        let share = 1.0 / n as f64;
        for name in &job.technician_names {
            let si = match index.get(name) {
                Some(&i) => i,
                None => {
                    stats.push(TechnicianStat::new(name.clone()));
                    let i = stats.len() - 1;
                    index.insert(name.clone(), i);
                    i
                }
            };
            let stat = &mut stats[si];
            match job.status_class {
                StatusClass::Closed => {
                    stat.total_jobs += share;
                    let revenue_share = job.reconciled_revenue * share;
                    stat.revenue += revenue_share;
                    stat.costs += job.total_costs * share;
                    stat.profit += job.gross_profit * share;
                    let rate = rates.get(name).copied().unwrap_or(default_rate);
                    stat.commission += revenue_share * rate;
                }
                StatusClass::Open => {
                    stat.active_jobs += 1;
                }
                StatusClass::Cancelled => {}
            }
        }
    }

    stats.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
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

    #[test]
    fn test_end_to_end_scenario() {
        let jobs = vec![
            njob(&[("Client Name", "A"), ("Sales", "100"), ("Status", "Closed"), ("Technician", "X")]),
            njob(&[("Client Name", "A"), ("Sales", "200"), ("Status", "New Lead"), ("Technician", "X")]),
        ];
        let customers = customer_rollup(jobs.clone());
        assert_eq!(customers.len(), 1);
        let a = &customers[0];
        assert_eq!(a.name, "A");
        assert_eq!(a.total_jobs, 2);
        assert_eq!(a.completed_jobs, 1);
        assert_eq!(a.cancelled_jobs, 0);
        assert_eq!(a.total_revenue, 100.0);

        let stats = technician_stats(&jobs, &HashMap::new(), 0.30);
        assert_eq!(stats.len(), 1);
        let x = &stats[0];
        assert_eq!(x.name, "X");
        assert_eq!(x.total_jobs, 1.0);
        assert_eq!(x.active_jobs, 1);
        assert_eq!(x.revenue, 100.0);
    }

    #[test]
    fn test_fractional_attribution() {
        let jobs = vec![njob(&[
            ("Client Name", "A"),
            ("Sales", "1000"),
            ("Status", "Closed"),
            ("Technician", "Dan, Ben"),
        ])];
        let stats = technician_stats(&jobs, &HashMap::new(), 0.30);
        assert_eq!(stats.len(), 2);
        for stat in &stats {
            assert_eq!(stat.revenue, 500.0);
            assert_eq!(stat.total_jobs, 0.5);
        }
    }

    #[test]
    fn test_conservation_of_revenue() {
        let jobs = vec![
            njob(&[("Client Name", "A"), ("Sales", "1000"), ("Status", "Closed"), ("Technician", "Dan, Ben")]),
            njob(&[("Client Name", "B"), ("Cash", "300"), ("CC", "150"), ("Status", "Completed"), ("Technician", "Avi")]),
            njob(&[("Client Name", "C"), ("Sales", "777"), ("Status", "closed - paid"), ("Technician", "Dan, Ben, Avi")]),
            njob(&[("Client Name", "D"), ("Sales", "999"), ("Status", "Cancelled"), ("Technician", "Dan")]),
            njob(&[("Client Name", "E"), ("Sales", "50"), ("Status", "New Lead"), ("Technician", "Ben")]),
        ];
        let closed_total: f64 = jobs
            .iter()
            .filter(|j| j.status_class == StatusClass::Closed)
            .map(|j| j.reconciled_revenue)
            .sum();
        let stats = technician_stats(&jobs, &HashMap::new(), 0.30);
        let attributed: f64 = stats.iter().map(|s| s.revenue).sum();
        assert!((attributed - closed_total).abs() < 1e-9, "{attributed} != {closed_total}");
    }

    #[test]
    fn test_job_with_no_technicians_contributes_to_nobody() {
        let jobs = vec![njob(&[("Client Name", "A"), ("Sales", "500"), ("Status", "Closed")])];
        let stats = technician_stats(&jobs, &HashMap::new(), 0.30);
        assert!(stats.is_empty());
        // The customer side still sees the money.
        let customers = customer_rollup(jobs);
        assert_eq!(customers[0].total_revenue, 500.0);
    }

    #[test]
    fn test_closed_set_partition() {
        let jobs = vec![
            njob(&[("Client Name", "A"), ("Status", "Closed")]),
            njob(&[("Client Name", "A"), ("Status", "Cancelled")]),
            njob(&[("Client Name", "A"), ("Status", "In Progress")]),
            njob(&[("Client Name", "A"), ("Status", "closed after cancel")]),
        ];
        let customers = customer_rollup(jobs);
        let a = &customers[0];
        assert_eq!(a.total_jobs, 4);
        assert_eq!(a.completed_jobs, 2);
        assert_eq!(a.cancelled_jobs, 1);
        // completed + cancelled + neither = total, nothing counted twice
        assert_eq!(a.completed_jobs + a.cancelled_jobs + 1, a.total_jobs);
    }

    #[test]
    fn test_commission_uses_rostered_rate() {
        let jobs = vec![njob(&[
            ("Client Name", "A"),
            ("Sales", "1000"),
            ("Status", "Closed"),
            ("Technician", "Dan, Rookie"),
        ])];
        let mut rates = HashMap::new();
        rates.insert("Dan".to_string(), 0.5);
        let stats = technician_stats(&jobs, &rates, 0.30);
        let dan = stats.iter().find(|s| s.name == "Dan").unwrap();
        let rookie = stats.iter().find(|s| s.name == "Rookie").unwrap();
        assert_eq!(dan.commission, 250.0);
        assert_eq!(rookie.commission, 150.0);
    }

    #[test]
    fn test_grouping_by_address() {
        let jobs = vec![
            njob(&[("Client Name", "A"), ("Address", "12 Oak St"), ("Status", "Closed"), ("Sales", "100")]),
            njob(&[("Client Name", "A"), ("Address", "99 Elm Ave"), ("Status", "New Lead")]),
            njob(&[("Client Name", "A"), ("Address", "12 Oak St"), ("Status", "New Lead")]),
            njob(&[("Client Name", "A"), ("Status", "New Lead")]),
        ];
        let customers = customer_rollup(jobs);
        let a = &customers[0];
        assert_eq!(a.locations.len(), 3);
        assert_eq!(a.locations[0].address, "12 Oak St");
        assert_eq!(a.locations[0].jobs.len(), 2);
        assert_eq!(a.locations[2].address, "Unknown Address");
    }

    #[test]
    fn test_unknown_customer_pooling() {
        let jobs = vec![
            njob(&[("Sales", "100"), ("Status", "Closed")]),
            njob(&[("Client Name", "  "), ("Sales", "200"), ("Status", "Closed")]),
        ];
        let customers = customer_rollup(jobs);
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "Unknown Customer");
        assert_eq!(customers[0].total_revenue, 300.0);
    }

    #[test]
    fn test_totals_are_order_independent() {
        let rows: Vec<NormalizedJob> = vec![
            njob(&[("Client Name", "A"), ("Sales", "100"), ("Status", "Closed")]),
            njob(&[("Client Name", "A"), ("Cash", "40"), ("Status", "Completed")]),
            njob(&[("Client Name", "A"), ("Sales", "999"), ("Status", "Cancelled")]),
            njob(&[("Client Name", "A"), ("Status", "New Lead")]),
        ];
        let forward = customer_rollup(rows.clone());
        let mut reversed_rows = rows;
        reversed_rows.reverse();
        let reversed = customer_rollup(reversed_rows);
        assert_eq!(forward[0].total_revenue, reversed[0].total_revenue);
        assert_eq!(forward[0].total_jobs, reversed[0].total_jobs);
        assert_eq!(forward[0].completed_jobs, reversed[0].completed_jobs);
        assert_eq!(forward[0].cancelled_jobs, reversed[0].cancelled_jobs);
    }

    #[test]
    fn test_first_last_job_dates() {
        let jobs = vec![
            njob(&[("Client Name", "A"), ("Date", "2024-03-10"), ("Status", "Closed")]),
            njob(&[("Client Name", "A"), ("Date", "2023-11-02"), ("Status", "Closed")]),
            njob(&[("Client Name", "A"), ("Date", "garbled"), ("Status", "New Lead")]),
        ];
        let customers = customer_rollup(jobs);
        let a = &customers[0];
        assert_eq!(a.first_job_date, NaiveDate::from_ymd_opt(2023, 11, 2));
        assert_eq!(a.last_job_date, NaiveDate::from_ymd_opt(2024, 3, 10));
    }

    #[test]
    fn test_customers_sorted_by_last_job_desc() {
        let jobs = vec![
            njob(&[("Client Name", "Old"), ("Date", "2023-01-01"), ("Status", "Closed")]),
            njob(&[("Client Name", "Fresh"), ("Date", "2024-06-01"), ("Status", "Closed")]),
            njob(&[("Client Name", "Dateless"), ("Status", "New Lead")]),
        ];
        let customers = customer_rollup(jobs);
        let names: Vec<&str> = customers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Fresh", "Old", "Dateless"]);
    }

    #[test]
    fn test_tags() {
        let jobs = vec![
            njob(&[("Client Name", "A"), ("Sales", "6000"), ("Status", "Closed")]),
            njob(&[("Client Name", "A"), ("Status", "New Lead")]),
            njob(&[("Client Name", "A"), ("Status", "New Lead")]),
            njob(&[("Client Name", "A"), ("Status", "New Lead")]),
        ];
        let customers = customer_rollup(jobs);
        assert_eq!(customers[0].tags, vec!["High Value", "Repeat Customer"]);

        let mut commercial = Customer::new("Acme Property Mgmt".to_string());
        commercial.customer_type = "commercial".to_string();
        assert_eq!(compute_tags(&commercial), vec!["Commercial"]);
    }

    #[test]
    fn test_cancelled_jobs_move_no_money() {
        let jobs = vec![njob(&[
            ("Client Name", "A"),
            ("Sales", "800"),
            ("Cash", "800"),
            ("Status", "Canceled"),
            ("Technician", "Dan"),
        ])];
        let customers = customer_rollup(jobs.clone());
        assert_eq!(customers[0].total_revenue, 0.0);
        assert_eq!(customers[0].cancelled_jobs, 1);
        let stats = technician_stats(&jobs, &HashMap::new(), 0.30);
        let dan = &stats[0];
        assert_eq!(dan.revenue, 0.0);
        assert_eq!(dan.total_jobs, 0.0);
        assert_eq!(dan.active_jobs, 0);
    }
}
