use crate::config::ExtractionConfig;
use crate::error::{GlosaError, Result};
use crate::models::{Invoice, MappingResult, ValueRecord};
use crate::service::document_matcher::DocumentMatcher;
use crate::service::similarity::SimilarityStrategy;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 抽取的单据类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    ValueRecord,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::ValueRecord => "value record",
        }
    }
}

/// 文档页码范围（从1开始，闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start_page: usize,
    pub end_page: usize,
}

/// 上传文件，已按页拆分
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub file_name: String,
    pub pages: Vec<Vec<u8>>,
}

/// 交给抽取器的单个文档页
#[derive(Debug, Clone)]
pub struct DocumentSlice {
    pub label: String,
    pub range: PageRange,
    pub pages: Vec<Vec<u8>>,
}

impl SourceDocument {
    /// 截取单个文档的页
    pub fn slice(&self, range: PageRange) -> Result<DocumentSlice> {
        let page_count = self.pages.len();
        if range.start_page == 0 || range.start_page > range.end_page || range.end_page > page_count {
            return Err(GlosaError::InvalidPageRange {
                start_page: range.start_page,
                end_page: range.end_page,
                page_count,
            });
        }

        Ok(DocumentSlice {
            label: format!("{} pages {}-{}", self.file_name, range.start_page, range.end_page),
            range,
            pages: self.pages[range.start_page - 1..range.end_page].to_vec(),
        })
    }
}

/// 结构化抽取能力（生产环境由LLM提供）
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// 将文档页抽取为 `kind` 对应的JSON对象
    async fn extract(&self, slice: &DocumentSlice, kind: DocumentKind) -> Result<serde_json::Value>;
}

/// 抽取任务
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub document: Arc<SourceDocument>,
    pub range: PageRange,
    pub kind: DocumentKind,
}

#[derive(Debug)]
pub struct ExtractionFailure {
    pub job_index: usize,
    pub label: String,
    pub error: GlosaError,
}

/// 批量抽取结果，保持任务顺序
#[derive(Debug, Default)]
pub struct ExtractionBatch {
    pub invoices: Vec<Invoice>,
    pub value_records: Vec<ValueRecord>,
    pub failures: Vec<ExtractionFailure>,
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub extraction: ExtractionBatch,
    pub mapping: MappingResult,
}

enum Extracted {
    Invoice(Invoice),
    ValueRecord(ValueRecord),
}

/// 抽取流水线 - 限制并发数
pub struct ExtractionPipeline {
    extractor: Arc<dyn DocumentExtractor>,
    max_concurrency: usize,
}

impl ExtractionPipeline {
    pub fn new(extractor: Arc<dyn DocumentExtractor>, max_concurrency: usize) -> Self {
        Self {
            extractor,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn from_config(extractor: Arc<dyn DocumentExtractor>, config: &ExtractionConfig) -> Self {
        Self::new(extractor, config.max_concurrency)
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// 执行所有抽取任务，输出保持任务顺序
    /// 单个任务失败只记录，不影响其他任务
    pub async fn extract_all(&self, jobs: Vec<ExtractionJob>) -> ExtractionBatch {
        let total = jobs.len();
        tracing::info!(
            "[Extraction] {} documents, up to {} in parallel",
            total,
            self.max_concurrency
        );

        let outcomes: Vec<(usize, String, Result<Extracted>)> = stream::iter(jobs.into_iter().enumerate())
            .map(|(job_index, job)| async move {
                let label = format!(
                    "{} {} pages {}-{}",
                    job.kind.as_str(),
                    job.document.file_name,
                    job.range.start_page,
                    job.range.end_page
                );
                let outcome = self.run_job(&job).await;
                (job_index, label, outcome)
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut batch = ExtractionBatch::default();
        for (job_index, label, outcome) in outcomes {
            match outcome {
                Ok(Extracted::Invoice(invoice)) => {
                    tracing::info!(
                        "[Extraction] {} -> invoice {}, total {}",
                        label,
                        invoice.invoice_number,
                        invoice.total_amount
                    );
                    batch.invoices.push(invoice);
                }
                Ok(Extracted::ValueRecord(record)) => {
                    tracing::info!(
                        "[Extraction] {} -> value record for invoice {}",
                        label,
                        record.invoice_number
                    );
                    batch.value_records.push(record);
                }
                Err(error) => {
                    tracing::warn!("[Extraction] {} failed: {}", label, error);
                    batch.failures.push(ExtractionFailure {
                        job_index,
                        label,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            "[Extraction] done - invoices: {}, value records: {}, failed: {}/{}",
            batch.invoices.len(),
            batch.value_records.len(),
            batch.failures.len(),
            total
        );

        batch
    }

    /// 先抽取，再匹配
    pub async fn run<S: SimilarityStrategy>(
        &self,
        jobs: Vec<ExtractionJob>,
        matcher: &DocumentMatcher<S>,
    ) -> PipelineOutcome {
        let extraction = self.extract_all(jobs).await;
        let mapping = matcher.map_documents(&extraction.invoices, &extraction.value_records);
        PipelineOutcome {
            extraction,
            mapping,
        }
    }

    async fn run_job(&self, job: &ExtractionJob) -> Result<Extracted> {
        let slice = job.document.slice(job.range)?;
        let value = self.extractor.extract(&slice, job.kind).await?;

        let decoded = match job.kind {
            DocumentKind::Invoice => serde_json::from_value(value).map(Extracted::Invoice),
            DocumentKind::ValueRecord => serde_json::from_value(value).map(Extracted::ValueRecord),
        };

        decoded.map_err(|source| GlosaError::Decode {
            kind: job.kind.as_str(),
            source,
        })
    }
}
