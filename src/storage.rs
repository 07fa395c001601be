use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::Course;

/// 课程数据文件名（JSON 数组）
pub const CATALOG_FILE: &str = "sf_courses_v1.json";
/// 当前选中课程的标记文件名（纯文本 id）
pub const SELECTION_FILE: &str = "sf_selected_course";

/// 持久化后端
///
/// Store 只通过这个接口读写数据，测试时可以注入内存实现
pub trait StorageBackend {
    /// 读取课程数据；文件不存在时返回 Ok(None)
    fn read_catalog(&self) -> io::Result<Option<Vec<Course>>>;

    /// 全量覆盖写入课程数据
    fn write_catalog(&self, courses: &[Course]) -> io::Result<()>;

    /// 读取选中课程标记；不存在或为空时返回 Ok(None)
    fn read_selection(&self) -> io::Result<Option<String>>;

    /// 写入选中课程标记
    fn write_selection(&self, id: &str) -> io::Result<()>;
}

/// 基于数据目录的文件后端
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn catalog_path(&self) -> PathBuf {
        self.dir.join(CATALOG_FILE)
    }

    fn selection_path(&self) -> PathBuf {
        self.dir.join(SELECTION_FILE)
    }
}

impl StorageBackend for FileBackend {
    fn read_catalog(&self) -> io::Result<Option<Vec<Course>>> {
        let path = self.catalog_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let courses: Vec<Course> = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(Some(courses))
    }

    fn write_catalog(&self, courses: &[Course]) -> io::Result<()> {
        let content = serde_json::to_string_pretty(courses)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(self.catalog_path(), content)
    }

    fn read_selection(&self) -> io::Result<Option<String>> {
        let path = self.selection_path();
        if !path.exists() {
            return Ok(None);
        }

        let id = fs::read_to_string(&path)?.trim().to_string();
        Ok(if id.is_empty() { None } else { Some(id) })
    }

    fn write_selection(&self, id: &str) -> io::Result<()> {
        fs::write(self.selection_path(), id)
    }
}
