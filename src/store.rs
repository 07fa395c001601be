use log::warn;

use crate::error::FeedbackError;
use crate::models::{Comment, Course, CourseCatalog};
use crate::storage::StorageBackend;

/// 课程存储服务
///
/// 持有内存中的课程目录和注入的持久化后端。
/// 每次变更后立即全量写回，读取失败时回退到演示数据。
/// 视图只拿到目录的只读快照。
pub struct Store {
    catalog: CourseCatalog,
    backend: Box<dyn StorageBackend>,
}

impl Store {
    /// 从后端加载课程目录
    ///
    /// 数据缺失时使用演示数据；读取或解析失败时同样回退，
    /// 只记录警告，绝不向调用方抛错。
    pub fn load(backend: Box<dyn StorageBackend>) -> Self {
        let catalog = match backend.read_catalog() {
            Ok(Some(courses)) => CourseCatalog::from_courses(courses),
            Ok(None) => CourseCatalog::seed(),
            Err(e) => {
                warn!("课程数据无法读取，回退到演示数据: {}", e);
                CourseCatalog::seed()
            }
        };

        Self { catalog, backend }
    }

    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    /// 全量覆盖写回，失败只记录日志（下次加载时回退兜底）
    fn persist(&self) {
        if let Err(e) = self.backend.write_catalog(&self.catalog.courses) {
            warn!("保存课程数据失败: {}", e);
        }
    }

    /// 新增课程，返回新课程的 id
    pub fn add_course(&mut self, name: &str) -> String {
        let course = Course::new(name.trim().to_string());
        let id = course.id.clone();
        self.catalog.courses.push(course);
        self.persist();
        id
    }

    /// 按 id 删除课程；课程不存在时是空操作
    pub fn delete_course(&mut self, id: &str) -> bool {
        let removed = self.catalog.remove(id);
        if removed {
            self.persist();
        }
        removed
    }

    /// 提交一条反馈
    ///
    /// 评分必须在 1-5 之间（0 表示未填写）；评论去掉首尾空白后
    /// 非空才会记录。校验失败时不改动任何状态。
    pub fn submit_feedback(
        &mut self,
        id: &str,
        rating: u8,
        comment: &str,
    ) -> Result<(), FeedbackError> {
        if !(1..=5).contains(&rating) {
            return Err(FeedbackError::InvalidRating);
        }

        let course = self
            .catalog
            .get_mut(id)
            .ok_or_else(|| FeedbackError::CourseNotFound(id.to_string()))?;

        course.ratings.push(rating);

        let comment = comment.trim();
        if !comment.is_empty() {
            course.comments.push(Comment::now(comment.to_string()));
        }

        self.persist();
        Ok(())
    }

    // ============ 选中课程标记 ============

    /// 读取最近一次选中的课程 id
    pub fn selected_course(&self) -> Option<String> {
        match self.backend.read_selection() {
            Ok(id) => id,
            Err(e) => {
                warn!("读取选中课程标记失败: {}", e);
                None
            }
        }
    }

    /// 记录选中的课程 id
    pub fn select_course(&self, id: &str) {
        if let Err(e) = self.backend.write_selection(id) {
            warn!("保存选中课程标记失败: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::storage::testing::MemoryBackend;

    fn seeded_store() -> (Store, Rc<RefCell<Option<Vec<Course>>>>) {
        let backend = MemoryBackend::default();
        let persisted = Rc::clone(&backend.catalog);
        (Store::load(Box::new(backend)), persisted)
    }

    #[test]
    fn test_load_seed_when_empty() {
        let (store, _) = seeded_store();
        assert_eq!(store.catalog().courses.len(), 3);
        assert!(store.catalog().get("c1").is_some());
    }

    #[test]
    fn test_load_falls_back_on_read_error() {
        let backend = MemoryBackend {
            fail_reads: true,
            ..MemoryBackend::default()
        };
        let store = Store::load(Box::new(backend));

        assert_eq!(store.catalog(), &CourseCatalog::seed());
    }

    #[test]
    fn test_load_prefers_persisted_data() {
        let backend = MemoryBackend::default();
        *backend.catalog.borrow_mut() = Some(vec![Course::new("Rust 入门".to_string())]);

        let store = Store::load(Box::new(backend));
        assert_eq!(store.catalog().courses.len(), 1);
        assert_eq!(store.catalog().courses[0].name, "Rust 入门");
    }

    #[test]
    fn test_add_course_persists() {
        let (mut store, persisted) = seeded_store();
        let id = store.add_course("  Rust 入门  ");

        let course = store.catalog().get(&id).unwrap();
        assert_eq!(course.name, "Rust 入门");
        assert!(course.ratings.is_empty());

        let saved = persisted.borrow().clone().unwrap();
        assert_eq!(saved.len(), 4);
        assert!(saved.iter().any(|c| c.id == id));
    }

    #[test]
    fn test_delete_course_persists() {
        let (mut store, persisted) = seeded_store();

        assert!(store.delete_course("c1"));
        assert!(!store.delete_course("c1"));

        let saved = persisted.borrow().clone().unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().all(|c| c.id != "c1"));
    }

    #[test]
    fn test_submit_feedback_appends_and_persists() {
        let (mut store, persisted) = seeded_store();

        store.submit_feedback("c1", 5, "很有收获").unwrap();

        let c1 = store.catalog().get("c1").unwrap();
        assert_eq!(c1.ratings, vec![5, 4, 4, 5, 3, 5, 5]);
        assert_eq!(c1.comments.last().unwrap().text, "很有收获");
        assert!(!c1.comments.last().unwrap().at.is_empty());

        let saved = persisted.borrow().clone().unwrap();
        let saved_c1 = saved.iter().find(|c| c.id == "c1").unwrap();
        assert_eq!(saved_c1.ratings.len(), 7);
    }

    #[test]
    fn test_submit_feedback_empty_comment_skipped() {
        let (mut store, _) = seeded_store();

        store.submit_feedback("c2", 4, "   ").unwrap();

        let c2 = store.catalog().get("c2").unwrap();
        assert_eq!(c2.ratings.len(), 6);
        assert_eq!(c2.comments.len(), 1);
    }

    #[test]
    fn test_submit_feedback_rejects_out_of_range() {
        let (mut store, persisted) = seeded_store();
        let before = store.catalog().get("c2").unwrap().clone();

        let err = store.submit_feedback("c2", 6, "太难了").unwrap_err();
        assert_eq!(err, FeedbackError::InvalidRating);

        // 校验失败时课程状态不变，也没有触发写回
        assert_eq!(store.catalog().get("c2"), Some(&before));
        assert!(persisted.borrow().is_none());

        // 0 表示未填写评分
        let err = store.submit_feedback("c2", 0, "").unwrap_err();
        assert_eq!(err, FeedbackError::InvalidRating);
    }

    #[test]
    fn test_submit_feedback_unknown_course() {
        let (mut store, _) = seeded_store();

        let err = store.submit_feedback("ghost", 3, "").unwrap_err();
        assert_eq!(err, FeedbackError::CourseNotFound("ghost".to_string()));
    }

    #[test]
    fn test_ratings_stay_in_range() {
        let (mut store, _) = seeded_store();

        for r in 0..=10u8 {
            let _ = store.submit_feedback("c3", r, "");
        }

        // 通过 submit_feedback 写入的评分事后检查全部在 1-5 之间
        let c3 = store.catalog().get("c3").unwrap();
        assert!(c3.ratings.iter().all(|r| (1..=5).contains(r)));
        assert_eq!(c3.ratings.len(), 5 + 5);
    }

    #[test]
    fn test_selection_marker() {
        let (store, _) = seeded_store();

        assert!(store.selected_course().is_none());
        store.select_course("c3");
        assert_eq!(store.selected_course().as_deref(), Some("c3"));
    }
}
