use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;

/// 固定间隔重试策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 总尝试次数（含首次请求）
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(attempts: u32, delay_ms: u64) -> Self {
        Self {
            attempts,
            delay: Duration::from_millis(delay_ms),
        }
    }

    pub const fn once() -> Self {
        Self::new(1, 0)
    }
}

/// 固定间隔重试工具。
/// 行情接口的失败形态多样（网络断连、限流、返回结构漂移），一律重试。
pub async fn retry_with_delay<F, Fut, T>(policy: RetryPolicy, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut last_err = None;

    for attempt in 1..=attempts {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                if attempt < attempts {
                    tracing::warn!(
                        "请求失败（第 {} 次），{} ms 后重试: {}",
                        attempt,
                        policy.delay.as_millis(),
                        e
                    );
                    sleep(policy.delay).await;
                }
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("retry exhausted")))
}

pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a>>;
pub type BoxedFetchFn<'a, T> = Box<dyn Fn() -> FetchFuture<'a, T> + 'a>;

/// 把返回任意 Future 的闭包装箱成数据源链可用的形式
pub fn boxed_fetch<'a, T, Fut, F>(f: F) -> BoxedFetchFn<'a, T>
where
    F: Fn() -> Fut + 'a,
    Fut: Future<Output = Result<T>> + 'a,
{
    Box::new(move || {
        let fut: FetchFuture<'a, T> = Box::pin(f());
        fut
    })
}

/// 有序数据源链中的一个候选源
pub struct SourceAttempt<'a, T> {
    pub label: &'static str,
    pub policy: RetryPolicy,
    /// 切换到该源之前的缓冲等待（主源失败后先歇一下再打备用接口）
    pub pause_before: Duration,
    pub fetch: BoxedFetchFn<'a, T>,
}

impl<'a, T> SourceAttempt<'a, T> {
    pub fn new(label: &'static str, policy: RetryPolicy, fetch: BoxedFetchFn<'a, T>) -> Self {
        Self {
            label,
            policy,
            pause_before: Duration::ZERO,
            fetch,
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause_before = pause;
        self
    }
}

/// 依次尝试数据源链，返回首个成功的结果及其在链中的序号。
/// 全部失败时返回最后一个源的错误。
pub async fn try_sources<T>(chain: Vec<SourceAttempt<'_, T>>) -> Result<(T, usize)> {
    let mut last_err = None;

    for (idx, source) in chain.into_iter().enumerate() {
        if idx > 0 && !source.pause_before.is_zero() {
            sleep(source.pause_before).await;
        }

        match retry_with_delay(source.policy, || (source.fetch)()).await {
            Ok(val) => {
                if idx > 0 {
                    tracing::warn!("主数据源失败，已切换至备用数据源「{}」", source.label);
                } else {
                    tracing::info!("数据源「{}」获取成功", source.label);
                }
                return Ok((val, idx));
            }
            Err(e) => {
                tracing::warn!("数据源「{}」不可用: {}", source.label, e);
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("没有可用的数据源")))
}
