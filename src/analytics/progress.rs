use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Progress of one processing stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskProgress {
    pub name: &'static str,
    pub current: usize,
    pub total: usize,
    pub status: TaskStatus,
}

impl TaskProgress {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            current: 0,
            total: 0,
            status: TaskStatus::Idle,
        }
    }

    /// Mark the task running; `total` is kept from before when `None`
    pub fn start(&mut self, total: Option<usize>) {
        self.status = TaskStatus::Running;
        if let Some(total) = total {
            self.total = total;
        }
    }

    pub fn update(&mut self, current: usize) {
        self.current = current;
    }

    pub fn complete(&mut self) {
        self.status = TaskStatus::Completed;
        self.current = self.total;
    }

    pub fn fail(&mut self) {
        self.status = TaskStatus::Failed;
    }

    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        self.current * 100 / self.total
    }
}

impl fmt::Display for TaskProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            TaskStatus::Idle => write!(f, "{}", self.name),
            TaskStatus::Running if self.total > 0 => write!(
                f,
                "{} {}/{} ({}%)",
                self.name,
                self.current,
                self.total,
                self.percent()
            ),
            TaskStatus::Running => write!(f, "{} {}", self.name, self.current),
            TaskStatus::Completed => write!(f, "{} completed", self.name),
            TaskStatus::Failed => write!(f, "{} failed", self.name),
        }
    }
}

/// Processing stages of a wallet, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    CheckBlacklist,
    CheckCnft,
    GetTransactions,
    FilterMeteoraTransactions,
    ProcessTimestamps,
    CalculateActivityMetrics,
    ExtractPoolAddress,
    GetPoolFees,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::CheckBlacklist,
        Stage::CheckCnft,
        Stage::GetTransactions,
        Stage::FilterMeteoraTransactions,
        Stage::ProcessTimestamps,
        Stage::CalculateActivityMetrics,
        Stage::ExtractPoolAddress,
        Stage::GetPoolFees,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::CheckBlacklist => "check_blacklist",
            Stage::CheckCnft => "check_cnft",
            Stage::GetTransactions => "get_transactions",
            Stage::FilterMeteoraTransactions => "filter_meteora_transactions",
            Stage::ProcessTimestamps => "process_timestamps",
            Stage::CalculateActivityMetrics => "calculate_activity_metrics",
            Stage::ExtractPoolAddress => "extract_pool_address",
            Stage::GetPoolFees => "get_pool_fees",
        }
    }

    /// Stages whose counters are shown in progress details
    pub fn is_counted(self) -> bool {
        matches!(
            self,
            Stage::FilterMeteoraTransactions | Stage::ExtractPoolAddress | Stage::GetPoolFees
        )
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Progress of every stage of one wallet
#[derive(Debug, Clone)]
pub struct StageTracker {
    tasks: [TaskProgress; 8],
}

impl Default for StageTracker {
    fn default() -> Self {
        Self {
            tasks: Stage::ALL.map(|stage| TaskProgress::new(stage.name())),
        }
    }
}

impl StageTracker {
    pub fn get(&self, stage: Stage) -> &TaskProgress {
        &self.tasks[stage.index()]
    }

    pub fn get_mut(&mut self, stage: Stage) -> &mut TaskProgress {
        &mut self.tasks[stage.index()]
    }

    /// `Running:` followed by the running counted stages; empty when
    /// nothing runs
    pub fn details(&self) -> String {
        let running: Vec<(Stage, &TaskProgress)> = Stage::ALL
            .iter()
            .map(|&stage| (stage, self.get(stage)))
            .filter(|(_, task)| task.status == TaskStatus::Running)
            .collect();

        if running.is_empty() {
            return String::new();
        }

        let mut message = String::from("Running:\n");
        for (stage, task) in running {
            if stage.is_counted() {
                message.push_str(&format!("{}\n", task));
            }
        }
        message
    }
}

/// Receives progress details while a wallet is processed
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, details: &str);
}
