// 内存记录源
// 用于测试和未配置数据库的本地运行；每个实例彼此隔离

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MessageSource, StoreError, UserSource};
use crate::geo::{BroadCoordinate, Coordinate};
use crate::models::{Message, Record, User};

/// 按插入顺序保存记录的表，锁不会跨越 await
#[derive(Debug)]
struct Table<T> {
    rows: RwLock<Vec<T>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Record> Table<T> {
    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<T>>, StoreError> {
        self.rows
            .read()
            .map_err(|_| StoreError::Unavailable(format!("{} table lock poisoned", T::KIND)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<T>>, StoreError> {
        self.rows
            .write()
            .map_err(|_| StoreError::Unavailable(format!("{} table lock poisoned", T::KIND)))
    }

    fn insert(&self, record: T) -> Result<(), StoreError> {
        let mut rows = self.write()?;
        if rows.iter().any(|row| row.id() == record.id()) {
            return Err(StoreError::Duplicate(record.id().to_string()));
        }
        rows.push(record);
        Ok(())
    }

    fn all(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.read()?.clone())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self.read()?.iter().find(|row| row.id() == id).cloned())
    }

    fn filter(&self, predicate: impl Fn(&T) -> bool) -> Result<Vec<T>, StoreError> {
        Ok(self.read()?.iter().filter(|row| predicate(*row)).cloned().collect())
    }
}

#[derive(Debug, Default)]
pub struct MemoryMessageSource {
    table: Table<Message>,
}

impl MemoryMessageSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageSource for MemoryMessageSource {
    async fn insert(&self, message: Message) -> Result<(), StoreError> {
        self.table.insert(message)
    }

    async fn all(&self) -> Result<Vec<Message>, StoreError> {
        self.table.all()
    }

    async fn find_by_id(&self, msg_id: &str) -> Result<Option<Message>, StoreError> {
        self.table.find_by_id(msg_id)
    }

    async fn find_by_broad_coordinate(&self, bucket: BroadCoordinate) -> Result<Vec<Message>, StoreError> {
        self.table.filter(|message| message.broad_coordinate == bucket)
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserSource {
    table: Table<User>,
}

impl MemoryUserSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserSource for MemoryUserSource {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        self.table.insert(user)
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        self.table.find_by_id(user_id)
    }

    async fn update_location(
        &self,
        user_id: &str,
        location: Coordinate,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut rows = self.table.write()?;
        match rows.iter_mut().find(|user| user.user_id == user_id) {
            Some(user) => {
                user.precise_coordinate = Some(location);
                user.last_updated = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn all(&self) -> Result<Vec<User>, StoreError> {
        self.table.all()
    }
}
