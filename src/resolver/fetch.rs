//! 存储访问句柄与批量读取
//!
//! 同一套解析算法在两种执行方式下运行：同步方式在调用线程上阻塞读取，
//! 批量读取交给固定大小的工作线程池；异步方式逐个等待存储调用，
//! 批量读取为每个目标类型创建一个任务并一起等待。两者都是 fork-join，
//! 结果按任务下标归位，与完成顺序无关

use crate::error::QuickGqlResult;
use crate::store::{AsyncDocumentStore, DocumentStore};
use crate::types::*;
use crossbeam_queue::SegQueue;
use futures::future::try_join_all;
use rat_logger::debug;

/// 对存储的借用，决定解析的执行方式
#[derive(Clone, Copy)]
pub enum StoreHandle<'a> {
    Sync(&'a dyn DocumentStore),
    Async(&'a dyn AsyncDocumentStore),
}

/// 一个目标类型的批量读取任务
#[derive(Debug, Clone, PartialEq)]
pub struct BatchTask {
    pub model: String,
    pub collection: String,
    pub ids: Vec<String>,
    pub fields: Vec<String>,
}

/// 批量读取的结果，与任务一一对应
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub model: String,
    pub documents: Vec<Document>,
}

impl<'a> StoreHandle<'a> {
    pub async fn find(&self, collection: &str, options: &QueryOptions) -> QuickGqlResult<Vec<Document>> {
        match self {
            StoreHandle::Sync(store) => store.find(collection, options),
            StoreHandle::Async(store) => store.find(collection, options).await,
        }
    }

    pub async fn count(&self, collection: &str, conditions: &[QueryCondition]) -> QuickGqlResult<Option<u64>> {
        match self {
            StoreHandle::Sync(store) => store.count(collection, conditions),
            StoreHandle::Async(store) => store.count(collection, conditions).await,
        }
    }

    pub async fn find_by_ids(
        &self,
        collection: &str,
        ids: &[String],
        fields: &[String],
    ) -> QuickGqlResult<Vec<Document>> {
        match self {
            StoreHandle::Sync(store) => store.find_by_ids(collection, ids, fields),
            StoreHandle::Async(store) => store.find_by_ids(collection, ids, fields).await,
        }
    }

    pub async fn get(&self, collection: &str, id: &str, fields: &[String]) -> QuickGqlResult<Option<Document>> {
        match self {
            StoreHandle::Sync(store) => store.get(collection, id, fields),
            StoreHandle::Async(store) => store.get(collection, id, fields).await,
        }
    }

    /// 执行全部批量任务，等待全部完成后按任务顺序返回
    ///
    /// 任一任务失败则整体失败
    pub async fn fetch_batches(&self, tasks: Vec<BatchTask>, pool_size: usize) -> QuickGqlResult<Vec<BatchResult>> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }
        debug!("批量读取: {} 个目标类型", tasks.len());
        match self {
            StoreHandle::Sync(store) => run_worker_pool(*store, tasks, pool_size),
            StoreHandle::Async(store) => {
                let fetches = tasks.into_iter().map(|task| async move {
                    let documents = store.find_by_ids(&task.collection, &task.ids, &task.fields).await?;
                    Ok::<_, crate::error::QuickGqlError>(BatchResult {
                        model: task.model,
                        documents,
                    })
                });
                try_join_all(fetches).await
            }
        }
    }
}

/// 固定大小的工作线程池
///
/// 工作线程从共享队列取任务直到队列为空，结果带着任务下标写回
fn run_worker_pool(
    store: &dyn DocumentStore,
    tasks: Vec<BatchTask>,
    pool_size: usize,
) -> QuickGqlResult<Vec<BatchResult>> {
    let total = tasks.len();
    let queue: SegQueue<(usize, BatchTask)> = SegQueue::new();
    for item in tasks.into_iter().enumerate() {
        queue.push(item);
    }
    let finished: SegQueue<(usize, QuickGqlResult<BatchResult>)> = SegQueue::new();
    let workers = pool_size.clamp(1, total);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                while let Some((index, task)) = queue.pop() {
                    let result = store
                        .find_by_ids(&task.collection, &task.ids, &task.fields)
                        .map(|documents| BatchResult {
                            model: task.model.clone(),
                            documents,
                        });
                    finished.push((index, result));
                }
            });
        }
    });

    let mut slots: Vec<Option<QuickGqlResult<BatchResult>>> = (0..total).map(|_| None).collect();
    while let Some((index, result)) = finished.pop() {
        slots[index] = Some(result);
    }
    slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| Err(crate::quick_error!(store, "批量读取任务未完成"))))
        .collect()
}
