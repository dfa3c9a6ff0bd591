//! Postgres schema definition
//!
//! The embedding column dimension is a store-wide invariant taken from the
//! configuration, so the DDL is rendered rather than a constant.

/// SQL schema for the news, report and price tables.
pub fn schema_sql(dimension: usize) -> String {
    format!(
        r#"
CREATE EXTENSION IF NOT EXISTS vector;

-- Parent news articles, deduplicated by source URL
CREATE TABLE IF NOT EXISTS news_documents (
    id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
    ticker TEXT NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    published_at TIMESTAMPTZ,
    url TEXT NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Embedded chunks; ticker is denormalized from the parent so similarity
-- queries can prune by ticker without a join
CREATE TABLE IF NOT EXISTS news_chunks (
    id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
    document_id BIGINT NOT NULL REFERENCES news_documents(id) ON DELETE CASCADE,
    ticker TEXT NOT NULL,
    content TEXT NOT NULL,
    embedding vector({dimension}) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- One report per ticker per business day
CREATE TABLE IF NOT EXISTS stock_reports (
    id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
    ticker TEXT NOT NULL,
    report TEXT NOT NULL,
    created_at DATE NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (ticker, created_at)
);

-- Daily OHLCV bars
CREATE TABLE IF NOT EXISTS stock_prices (
    ticker TEXT NOT NULL,
    trade_date DATE NOT NULL,
    open DOUBLE PRECISION NOT NULL,
    high DOUBLE PRECISION NOT NULL,
    low DOUBLE PRECISION NOT NULL,
    close DOUBLE PRECISION NOT NULL,
    volume BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (ticker, trade_date)
);

-- Indexes for performance
CREATE INDEX IF NOT EXISTS idx_news_documents_ticker ON news_documents(ticker);
CREATE INDEX IF NOT EXISTS idx_news_chunks_document ON news_chunks(document_id);
CREATE INDEX IF NOT EXISTS idx_news_chunks_ticker ON news_chunks(ticker);
CREATE INDEX IF NOT EXISTS idx_stock_reports_ticker ON stock_reports(ticker);
"#
    )
}
