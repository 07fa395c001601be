use chrono::Local;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// 课程评论
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    #[serde(default)]
    pub at: String, // 展示用时间标签，不参与排序
}

impl Comment {
    /// 以当前时间为标签创建评论
    pub fn now(text: String) -> Self {
        Self {
            text,
            at: Local::now().format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// 课程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ratings: Vec<u8>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Course {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            ratings: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// 平均评分，无评分时为 None
    pub fn average(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let sum: u32 = self.ratings.iter().map(|r| u32::from(*r)).sum();
        Some(f64::from(sum) / self.ratings.len() as f64)
    }

    /// 平均分的展示文本，保留两位小数，无评分时显示占位符
    pub fn average_label(&self) -> String {
        match self.average() {
            Some(avg) => format!("{:.2}", avg),
            None => "—".to_string(),
        }
    }

    /// 1-5 星的五桶直方图，区间外的评分不计入任何桶
    pub fn histogram(&self) -> [u32; 5] {
        let mut dist = [0u32; 5];
        for r in &self.ratings {
            if (1..=5).contains(r) {
                dist[usize::from(*r) - 1] += 1;
            }
        }
        dist
    }

    pub fn feedback_count(&self) -> usize {
        self.ratings.len()
    }
}

/// 列表排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// 名称升序
    #[default]
    Name,
    /// 平均分降序
    AvgDesc,
    /// 反馈数降序
    CountDesc,
}

impl SortOrder {
    /// 循环切换到下一种排序
    pub fn next(self) -> Self {
        match self {
            SortOrder::Name => SortOrder::AvgDesc,
            SortOrder::AvgDesc => SortOrder::CountDesc,
            SortOrder::CountDesc => SortOrder::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Name => "名称",
            SortOrder::AvgDesc => "平均分",
            SortOrder::CountDesc => "反馈数",
        }
    }
}

/// 课程目录（内存中的全量课程集合，按 id 唯一）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseCatalog {
    pub courses: Vec<Course>,
}

impl CourseCatalog {
    pub fn from_courses(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    /// 演示数据（持久化数据缺失或损坏时使用）
    pub fn seed() -> Self {
        let course = |id: &str, name: &str, ratings: &[u8], comments: &[(&str, &str)]| Course {
            id: id.to_string(),
            name: name.to_string(),
            ratings: ratings.to_vec(),
            comments: comments
                .iter()
                .map(|(text, at)| Comment {
                    text: (*text).to_string(),
                    at: (*at).to_string(),
                })
                .collect(),
        };

        Self {
            courses: vec![
                course(
                    "c1",
                    "JavaScript Basics",
                    &[5, 4, 4, 5, 3, 5],
                    &[("讲得很棒", "2 天前"), ("节奏合适", "1 周前")],
                ),
                course(
                    "c2",
                    "Python Programming",
                    &[3, 4, 2, 5, 4],
                    &[("进度太快", "3 天前")],
                ),
                course(
                    "c3",
                    "Data Science 101",
                    &[5, 5, 4, 4, 5],
                    &[("内容很充实", "4 天前"), ("结构清晰", "6 天前")],
                ),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Course> {
        self.courses.iter_mut().find(|c| c.id == id)
    }

    /// 课程在目录中的位置（用于选择器预选）
    pub fn position(&self, id: &str) -> Option<usize> {
        self.courses.iter().position(|c| c.id == id)
    }

    /// 按 id 移除课程，返回是否真的删除了
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.courses.len();
        self.courses.retain(|c| c.id != id);
        self.courses.len() < before
    }

    /// 按名称子串过滤（不区分大小写）并按指定方式排序
    pub fn filter_sorted(&self, term: &str, order: SortOrder) -> Vec<&Course> {
        let term = term.to_lowercase();
        let mut list: Vec<&Course> = self
            .courses
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&term))
            .collect();

        let by_name = |a: &Course, b: &Course| a.name.to_lowercase().cmp(&b.name.to_lowercase());

        match order {
            SortOrder::Name => list.sort_by(|a, b| by_name(a, b)),
            SortOrder::AvgDesc => list.sort_by(|a, b| {
                let avg_a = a.average().unwrap_or(0.0);
                let avg_b = b.average().unwrap_or(0.0);
                avg_b
                    .partial_cmp(&avg_a)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| by_name(a, b))
            }),
            SortOrder::CountDesc => list.sort_by(|a, b| {
                b.ratings
                    .len()
                    .cmp(&a.ratings.len())
                    .then_with(|| by_name(a, b))
            }),
        }

        list
    }
}
