#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingCaseFile,
    Compiling,
    Simulating,
    BuildingReport,
    Completed,
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            RunStage::LoadingCaseFile => "loading",
            RunStage::Compiling => "compiling",
            RunStage::Simulating => "simulating",
            RunStage::BuildingReport => "reporting",
            RunStage::Completed => "done",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CycleProgress {
    pub cycle: usize,
    pub depth_mm: f64,
    pub target_depth_mm: f64,
    pub fraction_complete: f64,
    pub sim_time_s: u64,
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub case_id: Option<String>,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub cycle: Option<CycleProgress>,
}
