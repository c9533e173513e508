//! Typed wrappers for each REST endpoint the client consumes.
//!
//! Paths are relative to the configured base (normally `/api`). Identifiers
//! are appended as whole segments, never spliced into the route text. Each
//! method fixes the payload type so shape mismatches surface as decode errors here
//! instead of deep inside a store.

use serde::de::IgnoredAny;
use serde_json::Value;

use super::ports::{ApiRequest, HttpTransport};
use super::{
    AcademicTerm, ApiClient, ApiError, AvailableClass, ConflictReport, Course, EnrollRequest,
    Enrollment, LoginCredentials, ProbeReport, Profile, ProfileUpdate, Registration, UserRecord,
};

fn to_body<B: serde::Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|err| ApiError::invalid_request(format!("failed to encode request body: {err}")))
}

fn with_term(request: ApiRequest, term: &AcademicTerm) -> ApiRequest {
    request
        .with_query("academicYear", term.academic_year)
        .with_query("semester", term.semester.as_query_value())
}

impl<T: HttpTransport> ApiClient<T> {
    /// `POST /auth/register`.
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let request = ApiRequest::post("/auth/register").with_body(to_body(registration)?);
        self.fetch::<IgnoredAny>(request).await.map(drop)
    }

    /// `POST /auth/login`; returns the authenticated identity.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<UserRecord, ApiError> {
        let request = ApiRequest::post("/auth/login").with_body(to_body(credentials)?);
        self.fetch(request).await
    }

    /// `POST /auth/logout`.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.fetch::<IgnoredAny>(ApiRequest::post("/auth/logout"))
            .await
            .map(drop)
    }

    /// `GET /auth/check-email`; true when the address is already registered.
    pub async fn check_email(&self, email: &str) -> Result<bool, ApiError> {
        self.fetch(ApiRequest::get("/auth/check-email").with_query("email", email))
            .await
    }

    /// `GET /auth/check-student-id`; true when the number is already taken.
    pub async fn check_student_id(&self, student_id: &str) -> Result<bool, ApiError> {
        self.fetch(ApiRequest::get("/auth/check-student-id").with_query("studentId", student_id))
            .await
    }

    /// `GET /auth/check-teacher-id`; true when the number is already taken.
    pub async fn check_teacher_id(&self, teacher_id: &str) -> Result<bool, ApiError> {
        self.fetch(ApiRequest::get("/auth/check-teacher-id").with_query("teacherId", teacher_id))
            .await
    }

    /// `GET /student/{id}`.
    pub async fn get_student_info(&self, student_id: &str) -> Result<Profile, ApiError> {
        self.fetch(ApiRequest::get("/student").with_segment(student_id))
            .await
    }

    /// `PUT /student/{id}`; returns the stored profile.
    pub async fn update_student_info(
        &self,
        student_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, ApiError> {
        let request = ApiRequest::put("/student")
            .with_segment(student_id)
            .with_body(to_body(update)?);
        self.fetch(request).await
    }

    /// `GET /student/courses/available`.
    pub async fn get_student_available_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.fetch(ApiRequest::get("/student/courses/available"))
            .await
    }

    /// `GET /student/enrollments/{id}`.
    pub async fn get_enrollments(&self, student_id: &str) -> Result<Vec<Enrollment>, ApiError> {
        self.fetch(ApiRequest::get("/student/enrollments").with_segment(student_id))
            .await
    }

    /// `GET /student/enrollments/{id}/semester`.
    pub async fn get_enrollments_by_semester(
        &self,
        student_id: &str,
        term: &AcademicTerm,
    ) -> Result<Vec<Enrollment>, ApiError> {
        let request = ApiRequest::get("/student/enrollments")
            .with_segment(student_id)
            .with_segment("semester");
        self.fetch(with_term(request, term)).await
    }

    /// `POST /student/enroll`; returns the created enrollment when the server
    /// echoes it.
    pub async fn enroll_course(
        &self,
        enrollment: &EnrollRequest,
    ) -> Result<Option<Enrollment>, ApiError> {
        let request = ApiRequest::post("/student/enroll").with_body(to_body(enrollment)?);
        self.fetch(request).await
    }

    /// `DELETE /student/drop`.
    pub async fn drop_course(&self, student_id: &str, class_id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::delete("/student/drop")
            .with_query("studentId", student_id)
            .with_query("classId", class_id);
        self.fetch::<IgnoredAny>(request).await.map(drop)
    }

    /// `GET /student/check-conflict`.
    pub async fn check_conflict(
        &self,
        student_id: &str,
        class_id: i64,
    ) -> Result<ConflictReport, ApiError> {
        let request = ApiRequest::get("/student/check-conflict")
            .with_query("studentId", student_id)
            .with_query("classId", class_id);
        self.fetch(request).await
    }

    /// `GET /courses`.
    pub async fn get_all_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.fetch(ApiRequest::get("/courses")).await
    }

    /// `GET /courses/{id}/classes`.
    pub async fn get_classes_by_course(
        &self,
        course_id: i64,
    ) -> Result<Vec<AvailableClass>, ApiError> {
        let request = ApiRequest::get("/courses")
            .with_segment(course_id)
            .with_segment("classes");
        self.fetch(request).await
    }

    /// `GET /courses/available`.
    pub async fn get_available_classes(
        &self,
        term: &AcademicTerm,
    ) -> Result<Vec<AvailableClass>, ApiError> {
        self.fetch(with_term(ApiRequest::get("/courses/available"), term))
            .await
    }

    /// `GET /courses/class/{id}`.
    pub async fn get_class_details(&self, class_id: i64) -> Result<AvailableClass, ApiError> {
        self.fetch(ApiRequest::get("/courses/class").with_segment(class_id))
            .await
    }

    /// `GET /test/health`.
    pub async fn health_check(&self) -> Result<ProbeReport, ApiError> {
        self.probe("/test/health").await
    }

    /// `GET /test/database`.
    pub async fn database_check(&self) -> Result<ProbeReport, ApiError> {
        self.probe("/test/database").await
    }

    async fn probe(&self, path: &str) -> Result<ProbeReport, ApiError> {
        let envelope = self.send(ApiRequest::get(path)).await?;
        Ok(ProbeReport {
            message: envelope.message().map(str::to_owned),
            detail: envelope.data.unwrap_or(Value::Null),
        })
    }
}
