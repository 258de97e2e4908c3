use serde::Serialize;

/// Timeline of one customer who completed service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub id: usize,
    pub arrival_time: f64,
    pub service_start_time: f64,
    pub departure_time: f64,
}

impl CustomerRecord {
    pub fn wait_time(&self) -> f64 {
        self.service_start_time - self.arrival_time
    }

    pub fn system_time(&self) -> f64 {
        self.departure_time - self.arrival_time
    }
}

/// Everything a finished run measured.
///
/// Per-customer sequences are in departure order and index `i` of
/// `wait_times`, `system_times` and `customers` is the same customer.
/// Customers still waiting or in service at the horizon appear nowhere. The
/// three time-series vectors always have equal length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub num_servers: usize,
    pub wait_times: Vec<f64>,
    pub system_times: Vec<f64>,
    pub sample_times: Vec<f64>,
    pub queue_lengths: Vec<usize>,
    pub busy_counts: Vec<usize>,
    pub customers: Vec<CustomerRecord>,
}

impl SimulationResult {
    pub fn completed(&self) -> usize {
        self.customers.len()
    }
}

/// Append-only accumulator the processes write into during a run.
#[derive(Debug, Default)]
pub struct StatisticsCollector {
    wait_times: Vec<f64>,
    system_times: Vec<f64>,
    sample_times: Vec<f64>,
    queue_lengths: Vec<usize>,
    busy_counts: Vec<usize>,
    customers: Vec<CustomerRecord>,
}

impl StatisticsCollector {
    pub fn new() -> StatisticsCollector {
        StatisticsCollector::default()
    }

    /// Commit a departed customer's measurements.
    pub fn record_departure(&mut self, customer: CustomerRecord) {
        self.wait_times.push(customer.wait_time());
        self.system_times.push(customer.system_time());
        self.customers.push(customer);
    }

    pub fn record_sample(&mut self, t: f64, queue_length: usize, busy_count: usize) {
        self.sample_times.push(t);
        self.queue_lengths.push(queue_length);
        self.busy_counts.push(busy_count);
    }

    pub fn finish(self, num_servers: usize) -> SimulationResult {
        SimulationResult {
            num_servers,
            wait_times: self.wait_times,
            system_times: self.system_times,
            sample_times: self.sample_times,
            queue_lengths: self.queue_lengths,
            busy_counts: self.busy_counts,
            customers: self.customers,
        }
    }
}
