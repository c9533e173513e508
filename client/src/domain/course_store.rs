//! Local mirror of the course catalogue and the student's enrollments.
//!
//! Every action marks the store busy for its whole duration, calls the API
//! client and only replaces mirrored state when the call succeeds. Enroll and
//! drop re-fetch the enrollment list from the server instead of patching it.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::ports::HttpTransport;
use super::{
    AcademicTerm, ApiClient, ApiResult, AvailableClass, BusyFlag, Course, EnrollRequest,
    Enrollment,
};

/// Snapshot of the mirrored catalogue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseCatalogMirror {
    /// All courses, in server order.
    pub courses: Vec<Course>,
    /// Classes open for enrollment in the last requested term.
    pub available_classes: Vec<AvailableClass>,
    /// The student's enrollments, in server order.
    pub enrollments: Vec<Enrollment>,
}

/// Course and enrollment actions over a shared [`ApiClient`].
pub struct CourseStore<T> {
    api: Arc<ApiClient<T>>,
    state: RwLock<CourseCatalogMirror>,
    busy: BusyFlag,
}

impl<T> CourseStore<T> {
    /// Create an empty store.
    pub fn new(api: Arc<ApiClient<T>>) -> Self {
        Self {
            api,
            state: RwLock::new(CourseCatalogMirror::default()),
            busy: BusyFlag::new(),
        }
    }

    /// Whether a request issued by this store is outstanding.
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Clone of the mirrored state.
    pub fn snapshot(&self) -> CourseCatalogMirror {
        self.read().clone()
    }

    /// Mirrored course list.
    pub fn courses(&self) -> Vec<Course> {
        self.read().courses.clone()
    }

    /// Mirrored available classes.
    pub fn available_classes(&self) -> Vec<AvailableClass> {
        self.read().available_classes.clone()
    }

    /// Mirrored enrollments.
    pub fn enrollments(&self) -> Vec<Enrollment> {
        self.read().enrollments.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, CourseCatalogMirror> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CourseCatalogMirror> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: HttpTransport> CourseStore<T> {
    /// Replace the course list with the server's.
    ///
    /// # Errors
    ///
    /// Returns the API error; the mirror is left unchanged.
    pub async fn fetch_courses(&self) -> ApiResult<()> {
        let _busy = self.busy.enter();
        let courses = self.api.get_all_courses().await?;
        debug!(count = courses.len(), "course list refreshed");
        self.write().courses = courses;
        Ok(())
    }

    /// Replace the available classes with those open in `term`.
    ///
    /// # Errors
    ///
    /// Returns the API error; the mirror is left unchanged.
    pub async fn fetch_available_classes(&self, term: &AcademicTerm) -> ApiResult<()> {
        let _busy = self.busy.enter();
        let classes = self.api.get_available_classes(term).await?;
        debug!(
            count = classes.len(),
            academic_year = term.academic_year,
            semester = %term.semester,
            "available classes refreshed"
        );
        self.write().available_classes = classes;
        Ok(())
    }

    /// Replace the enrollment list with `student_id`'s.
    ///
    /// # Errors
    ///
    /// Returns the API error; the mirror is left unchanged.
    pub async fn fetch_my_enrollments(&self, student_id: &str) -> ApiResult<()> {
        let _busy = self.busy.enter();
        self.refresh_enrollments(student_id).await
    }

    /// Enroll in a class, then re-fetch the student's enrollments.
    ///
    /// Returns the enrollment echoed by the server, if any. A failed re-fetch
    /// after a successful enroll is logged and does not fail the action.
    ///
    /// # Errors
    ///
    /// Returns the API error when the server refuses the enrollment.
    pub async fn enroll(&self, request: &EnrollRequest) -> ApiResult<Option<Enrollment>> {
        let _busy = self.busy.enter();
        let created = self.api.enroll_course(request).await?;
        debug!(student_id = %request.student_id, class_id = request.class_id, "enrolled");
        self.refresh_after_mutation(&request.student_id).await;
        Ok(created)
    }

    /// Drop a class, then re-fetch the student's enrollments.
    ///
    /// # Errors
    ///
    /// Returns the API error when the server refuses the drop.
    pub async fn drop_course(&self, student_id: &str, class_id: i64) -> ApiResult<()> {
        let _busy = self.busy.enter();
        self.api.drop_course(student_id, class_id).await?;
        debug!(student_id, class_id, "dropped");
        self.refresh_after_mutation(student_id).await;
        Ok(())
    }

    async fn refresh_enrollments(&self, student_id: &str) -> ApiResult<()> {
        let enrollments = self.api.get_enrollments(student_id).await?;
        debug!(student_id, count = enrollments.len(), "enrollments refreshed");
        self.write().enrollments = enrollments;
        Ok(())
    }

    async fn refresh_after_mutation(&self, student_id: &str) {
        if let Err(err) = self.refresh_enrollments(student_id).await {
            warn!(student_id, error = %err, "enrollment list is stale after mutation");
        }
    }
}

#[cfg(test)]
#[path = "course_store_tests.rs"]
mod tests;
