//! 有序键值存储
//!
//! [`StableMap`] 在内存中维护一张按键升序排列的表，并可选地把每次修改
//! 以快照形式写入 `<data_dir>/table-<id>.json`，进程重启后从快照恢复。

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 存储错误类型
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("文件读写错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("快照序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// 键值存储接口
///
/// 每个操作单独原子执行；多个操作之间没有事务保证。
pub trait KeyValueStore<V>: Send + Sync {
    /// 按键查询，不存在时返回 `None`
    fn get(&self, key: &str) -> StoreResult<Option<V>>;

    /// 插入或覆盖，返回旧值
    fn insert(&self, key: &str, value: V) -> StoreResult<Option<V>>;

    /// 删除，返回被删除的值
    fn remove(&self, key: &str) -> StoreResult<Option<V>>;

    /// 按键升序返回全部值
    fn values(&self) -> StoreResult<Vec<V>>;

    fn len(&self) -> StoreResult<usize> {
        Ok(self.values()?.len())
    }
}

pub struct StableMap<V> {
    entries: RwLock<BTreeMap<String, V>>,
    snapshot: Option<PathBuf>,
}

impl<V> StableMap<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    /// 仅驻留内存的表，不做持久化
    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            snapshot: None,
        }
    }

    /// 打开 `data_dir` 下编号为 `table_id` 的表，快照存在时加载
    pub fn open<P: AsRef<Path>>(data_dir: P, table_id: u8) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;

        let path = data_dir.join(format!("table-{}.json", table_id));
        let entries = if path.exists() {
            let content = fs::read(&path)?;
            serde_json::from_slice::<BTreeMap<String, V>>(&content)?
        } else {
            BTreeMap::new()
        };

        info!(path = %path.display(), records = entries.len(), "存储表已打开");

        Ok(Self {
            entries: RwLock::new(entries),
            snapshot: Some(path),
        })
    }

    /// 把整张表写入快照：先写临时文件，再原子重命名
    fn persist(&self, entries: &BTreeMap<String, V>) -> StoreResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let content = serde_json::to_vec(entries)?;
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&content)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)?;

        debug!(path = %path.display(), records = entries.len(), "快照已写入");
        Ok(())
    }
}

impl<V> KeyValueStore<V> for StableMap<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    fn get(&self, key: &str) -> StoreResult<Option<V>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn insert(&self, key: &str, value: V) -> StoreResult<Option<V>> {
        let mut entries = self.entries.write();
        let previous = entries.insert(key.to_string(), value);

        if let Err(err) = self.persist(&entries) {
            // 回滚内存中的修改
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(err);
        }

        Ok(previous)
    }

    fn remove(&self, key: &str) -> StoreResult<Option<V>> {
        let mut entries = self.entries.write();
        let Some(removed) = entries.remove(key) else {
            return Ok(None);
        };

        if let Err(err) = self.persist(&entries) {
            entries.insert(key.to_string(), removed);
            return Err(err);
        }

        Ok(Some(removed))
    }

    fn values(&self) -> StoreResult<Vec<V>> {
        Ok(self.entries.read().values().cloned().collect())
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.entries.read().len())
    }
}
