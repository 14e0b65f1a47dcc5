use anyhow::{Result, anyhow};

use crate::models::ai::{AIConfig, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::models::market::{FundFlowWindow, SectorLeaderboard};
use crate::utils::http::build_ai_client;
use crate::utils::render;

/// AI 研报生成服务，走 OpenAI 兼容的 chat/completions 接口
pub struct AIService;

impl AIService {
    /// 大盘宏观分析报告
    pub async fn generate_market_report(
        config: &AIConfig,
        board: &SectorLeaderboard,
    ) -> Result<String> {
        let prompt = build_market_prompt(board);
        Self::chat_completion(config, &prompt).await
    }

    /// 个股主力资金意图分析报告
    pub async fn generate_stock_report(
        config: &AIConfig,
        window: &FundFlowWindow,
    ) -> Result<String> {
        let prompt = build_stock_prompt(window);
        Self::chat_completion(config, &prompt).await
    }

    async fn chat_completion(config: &AIConfig, prompt: &str) -> Result<String> {
        if config.api_key.is_empty() {
            return Err(anyhow!("未配置 API Key，请设置环境变量 LLM_API_KEY"));
        }

        let client = build_ai_client(config.timeout_secs)?;
        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        let request = ChatCompletionRequest {
            model: config.model_name.clone(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: Some(config.max_tokens),
            temperature: Some(config.temperature),
        };

        tracing::debug!("调用 AI 接口: {} model={}", url, config.model_name);

        let response = client
            .post(&url)
            .header("Authorization", format!("Bearer {}", config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(anyhow!("AI API error ({}): {}", status, body));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            let head: String = body.chars().take(200).collect();
            anyhow!("AI 响应解析失败: {} - {}", e, head)
        })?;

        let content = parsed
            .choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(anyhow!("AI 返回了空内容"));
        }
        Ok(content)
    }
}

/// 大盘分析提示词，附当日板块涨幅榜
pub fn build_market_prompt(board: &SectorLeaderboard) -> String {
    format!(
        "你是一位资深的A股市场宏观分析师。以下是今日{}涨幅榜 Top 10 数据：\n\n{}\n\n\
         请根据这份数据写一篇《今日大盘宏观分析与明日预测》，要求：\n\
         1. 大盘定调：用一句话概括今日市场情绪（如放量普涨、缩量分化等）。\n\
         2. 核心主线：从涨幅榜中提炼出今日最强的 1-2 条资金主线，并分析其持续性。\n\
         3. 明日预测：给出明日大盘的大概率走向（看多/看空/震荡），并说明理由。\n\
         请使用 Markdown 格式输出，语言专业但通俗易懂。",
        board.kind_name(),
        render::sector_table(board)
    )
}

/// 个股资金流提示词，附最近 5 个交易日主力数据
pub fn build_stock_prompt(window: &FundFlowWindow) -> String {
    format!(
        "你是一位专注于筹码和资金流向分析的A股游资操盘手。以下是股票 {} 最近 5 个交易日的主力资金流向数据（单位：万元）：\n\n{}\n\n\
         请根据这份数据写一篇《个股主力资金意图分析报告》，要求：\n\
         1. 主力意图：判断主力当前处于哪个阶段（吸筹/震荡洗盘/派发出货），结合超大单和大单的流向说明依据。\n\
         2. 量价配合：分析资金流向与股价涨跌的匹配度，指出背离信号（如有）。\n\
         3. 交易建议：给出短线操作建议（观望/轻仓试错/回避），并说明风险点。\n\
         请使用 Markdown 格式输出，语言犀利直接。",
        window.symbol,
        render::fund_flow_table(window)
    )
}
