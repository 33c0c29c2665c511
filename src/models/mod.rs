// Models module

pub mod school;

// Re-export commonly used types
pub use school::{
    CreateSchoolRequest, CreateSchoolResponse, ListSchoolsQuery, ListSchoolsResponse, NewSchool,
    ReferencePoint, School, SchoolWithDistance,
};
