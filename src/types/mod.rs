pub mod formation;
pub mod job;
pub mod profile;
pub mod response;

pub use formation::{FormationRecommendation, ReconversionPath};
pub use job::{ExperienceTier, JobRecommendation, RawJobPosting};
pub use profile::{CandidateProfile, DetectedMetier, RomeoAnalysis};
pub use response::{AiMetadata, AnalysisReport, CvAnalysis, SourceMetadata};
