//! Initial database migration.
//!
//! Creates all enums, tables, indexes, the updated_at trigger, and seeds
//! the minimum chart of accounts.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: MEMBERS & CATALOG
        // ============================================================
        db.execute_unprepared(MEMBERS_SQL).await?;
        db.execute_unprepared(PRODUCT_TYPES_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(MEMBER_FEES_SQL).await?;

        // ============================================================
        // PART 3: TRANSACTIONS
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 4: GENERAL LEDGER
        // ============================================================
        db.execute_unprepared(GL_ACCOUNTS_SQL).await?;
        db.execute_unprepared(TEMPLATES_SQL).await?;
        db.execute_unprepared(JOURNALS_SQL).await?;

        // ============================================================
        // PART 5: GUARANTEES & LOAN APPLICATIONS
        // ============================================================
        db.execute_unprepared(GUARANTOR_PROFILES_SQL).await?;
        db.execute_unprepared(LOAN_APPLICATIONS_SQL).await?;
        db.execute_unprepared(GUARANTEE_REQUESTS_SQL).await?;

        // ============================================================
        // PART 6: BULK INGESTION
        // ============================================================
        db.execute_unprepared(BULK_LOGS_SQL).await?;

        // ============================================================
        // PART 7: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 8: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_CHART_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE product_kind AS ENUM ('savings', 'venture', 'loan', 'fee');

CREATE TYPE fee_classification AS ENUM (
    'income',
    'liability',
    'equity',
    'asset',
    'expense'
);

CREATE TYPE gl_account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

CREATE TYPE transaction_kind AS ENUM (
    'savings_deposit',
    'savings_withdrawal',
    'venture_deposit',
    'venture_payment',
    'loan_disbursement',
    'loan_repayment',
    'fee_payment',
    'loan_interest_accrual'
);

CREATE TYPE transaction_status AS ENUM (
    'pending',
    'processing',
    'completed',
    'failed',
    'approved',
    'rejected'
);

CREATE TYPE payment_method AS ENUM (
    'cash',
    'mobile_money',
    'bank_transfer',
    'cheque'
);

CREATE TYPE repayment_type AS ENUM ('principal', 'interest_payment');

CREATE TYPE application_status AS ENUM (
    'pending',
    'ready_for_amendment',
    'amended',
    'in_progress',
    'ready_for_submission',
    'submitted',
    'approved',
    'disbursed',
    'declined',
    'cancelled'
);

CREATE TYPE calculation_mode AS ENUM ('fixed_term', 'fixed_payment');

CREATE TYPE repayment_frequency AS ENUM (
    'daily',
    'weekly',
    'biweekly',
    'monthly',
    'quarterly',
    'annually'
);

CREATE TYPE guarantee_status AS ENUM (
    'pending',
    'accepted',
    'declined',
    'cancelled'
);
";

const MEMBERS_SQL: &str = r"
CREATE TABLE members (
    id UUID PRIMARY KEY,
    member_number VARCHAR(16) NOT NULL UNIQUE,
    first_name VARCHAR(120) NOT NULL,
    last_name VARCHAR(120) NOT NULL,
    email VARCHAR(254) NOT NULL UNIQUE,
    phone VARCHAR(32),
    password_hash TEXT NOT NULL,
    is_member BOOLEAN NOT NULL DEFAULT TRUE,
    is_system_admin BOOLEAN NOT NULL DEFAULT FALSE,
    is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
    is_approved BOOLEAN NOT NULL DEFAULT TRUE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    reference VARCHAR(12) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const PRODUCT_TYPES_SQL: &str = r"
CREATE TABLE product_types (
    id UUID PRIMARY KEY,
    kind product_kind NOT NULL,
    name VARCHAR(160) NOT NULL UNIQUE,
    description TEXT,
    interest_rate NUMERIC(8, 4),
    standard_amount NUMERIC(18, 2),
    fee_classification fee_classification,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    reference VARCHAR(12) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    member_id UUID NOT NULL REFERENCES members(id),
    product_type_id UUID NOT NULL REFERENCES product_types(id),
    kind product_kind NOT NULL,
    account_number VARCHAR(16) NOT NULL UNIQUE,
    balance NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (balance >= 0),
    interest_accrued NUMERIC(18, 2) CHECK (interest_accrued IS NULL OR interest_accrued >= 0),
    last_interest_calculation TIMESTAMPTZ,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    reference VARCHAR(12) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (member_id, product_type_id)
);

CREATE INDEX idx_accounts_member ON accounts(member_id);
CREATE INDEX idx_accounts_kind ON accounts(kind);
";

const MEMBER_FEES_SQL: &str = r"
CREATE TABLE member_fees (
    id UUID PRIMARY KEY,
    member_id UUID NOT NULL REFERENCES members(id),
    product_type_id UUID NOT NULL REFERENCES product_types(id),
    amount_paid NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (amount_paid >= 0),
    is_paid BOOLEAN NOT NULL DEFAULT FALSE,
    reference VARCHAR(12) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (member_id, product_type_id)
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL REFERENCES accounts(id),
    kind transaction_kind NOT NULL,
    amount NUMERIC(18, 2) NOT NULL CHECK (amount > 0),
    payment_method payment_method NOT NULL,
    currency VARCHAR(3) NOT NULL DEFAULT 'KES',
    status transaction_status NOT NULL,
    repayment_type repayment_type,
    receipt_number VARCHAR(64),
    description TEXT,
    identity VARCHAR(20) NOT NULL UNIQUE,
    transaction_date DATE NOT NULL,
    recorded_by UUID NOT NULL REFERENCES members(id),
    reference VARCHAR(12) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_transactions_account ON transactions(account_id);
CREATE INDEX idx_transactions_identity_prefix
    ON transactions(identity varchar_pattern_ops);
CREATE INDEX idx_transactions_date ON transactions(transaction_date);
";

const GL_ACCOUNTS_SQL: &str = r"
CREATE TABLE gl_accounts (
    id UUID PRIMARY KEY,
    code VARCHAR(12) NOT NULL UNIQUE,
    name VARCHAR(160) NOT NULL,
    account_type gl_account_type NOT NULL,
    parent_id UUID REFERENCES gl_accounts(id) CHECK (parent_id <> id),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    reference VARCHAR(12) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TEMPLATES_SQL: &str = r"
CREATE TABLE transaction_templates (
    id UUID PRIMARY KEY,
    code VARCHAR(80) NOT NULL UNIQUE,
    description TEXT,
    reference VARCHAR(12) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE template_lines (
    id UUID PRIMARY KEY,
    template_id UUID NOT NULL REFERENCES transaction_templates(id) ON DELETE CASCADE,
    gl_account_id UUID NOT NULL REFERENCES gl_accounts(id),
    is_debit BOOLEAN NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_template_lines_template ON template_lines(template_id);
";

const JOURNALS_SQL: &str = r"
CREATE TABLE journals (
    id UUID PRIMARY KEY,
    transaction_date DATE NOT NULL,
    description TEXT NOT NULL,
    source_model VARCHAR(64) NOT NULL,
    reference_id UUID NOT NULL,
    template_id UUID REFERENCES transaction_templates(id),
    posted_by UUID NOT NULL REFERENCES members(id),
    reference VARCHAR(12) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (source_model, reference_id)
);

CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    journal_id UUID NOT NULL REFERENCES journals(id) ON DELETE CASCADE,
    gl_account_id UUID NOT NULL REFERENCES gl_accounts(id),
    debit NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (credit >= 0),
    transaction_date DATE NOT NULL,
    source_model VARCHAR(64) NOT NULL,
    reference_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK ((debit > 0 AND credit = 0) OR (credit > 0 AND debit = 0))
);

CREATE INDEX idx_journal_entries_journal ON journal_entries(journal_id);
CREATE INDEX idx_journal_entries_account_date
    ON journal_entries(gl_account_id, transaction_date);
";

const GUARANTOR_PROFILES_SQL: &str = r"
CREATE TABLE guarantor_profiles (
    id UUID PRIMARY KEY,
    member_id UUID NOT NULL UNIQUE REFERENCES members(id),
    is_eligible BOOLEAN NOT NULL DEFAULT TRUE,
    max_active_guarantees INTEGER NOT NULL DEFAULT 5 CHECK (max_active_guarantees >= 0),
    max_guarantee_amount NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (max_guarantee_amount >= 0),
    committed_guarantee_amount NUMERIC(18, 2) NOT NULL DEFAULT 0
        CHECK (committed_guarantee_amount >= 0),
    reference VARCHAR(12) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const LOAN_APPLICATIONS_SQL: &str = r"
CREATE TABLE loan_applications (
    id UUID PRIMARY KEY,
    member_id UUID NOT NULL REFERENCES members(id),
    product_type_id UUID NOT NULL REFERENCES product_types(id),
    requested_amount NUMERIC(18, 2) NOT NULL CHECK (requested_amount > 0),
    calculation_mode calculation_mode NOT NULL,
    term_months INTEGER NOT NULL CHECK (term_months > 0),
    monthly_payment NUMERIC(18, 2) NOT NULL,
    total_interest NUMERIC(18, 2) NOT NULL,
    repayment_amount NUMERIC(18, 2) NOT NULL,
    repayment_frequency repayment_frequency NOT NULL DEFAULT 'monthly',
    start_date DATE NOT NULL,
    projection JSONB NOT NULL,
    self_guaranteed_amount NUMERIC(18, 2) NOT NULL DEFAULT 0
        CHECK (self_guaranteed_amount >= 0),
    loan_account_id UUID REFERENCES accounts(id),
    status application_status NOT NULL DEFAULT 'pending',
    reference VARCHAR(12) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_loan_applications_member ON loan_applications(member_id);
CREATE INDEX idx_loan_applications_status ON loan_applications(status);
CREATE INDEX idx_loan_applications_account ON loan_applications(loan_account_id);
";

const GUARANTEE_REQUESTS_SQL: &str = r"
CREATE TABLE guarantee_requests (
    id UUID PRIMARY KEY,
    loan_application_id UUID NOT NULL REFERENCES loan_applications(id),
    guarantor_profile_id UUID NOT NULL REFERENCES guarantor_profiles(id),
    guaranteed_amount NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (guaranteed_amount >= 0),
    outstanding_amount NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (outstanding_amount >= 0),
    status guarantee_status NOT NULL DEFAULT 'pending',
    note TEXT,
    is_self BOOLEAN NOT NULL DEFAULT FALSE,
    reference VARCHAR(12) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (loan_application_id, guarantor_profile_id)
);

CREATE INDEX idx_guarantee_requests_profile ON guarantee_requests(guarantor_profile_id);
";

const BULK_LOGS_SQL: &str = r"
CREATE TABLE bulk_transaction_logs (
    id UUID PRIMARY KEY,
    recorded_by UUID NOT NULL REFERENCES members(id),
    transaction_kind transaction_kind NOT NULL,
    reference_prefix VARCHAR(64) NOT NULL,
    success_count INTEGER NOT NULL DEFAULT 0,
    error_count INTEGER NOT NULL DEFAULT 0,
    errors JSONB NOT NULL DEFAULT '[]'::jsonb,
    file_name VARCHAR(255),
    archive_url TEXT,
    reference VARCHAR(12) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_members_updated_at
    BEFORE UPDATE ON members
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_product_types_updated_at
    BEFORE UPDATE ON product_types
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_accounts_updated_at
    BEFORE UPDATE ON accounts
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_member_fees_updated_at
    BEFORE UPDATE ON member_fees
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_transactions_updated_at
    BEFORE UPDATE ON transactions
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_guarantor_profiles_updated_at
    BEFORE UPDATE ON guarantor_profiles
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_loan_applications_updated_at
    BEFORE UPDATE ON loan_applications
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_guarantee_requests_updated_at
    BEFORE UPDATE ON guarantee_requests
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_bulk_logs_updated_at
    BEFORE UPDATE ON bulk_transaction_logs
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const SEED_CHART_SQL: &str = r"
INSERT INTO gl_accounts (id, code, name, account_type, reference)
VALUES
    (gen_random_uuid(), '1010', 'Cash at Bank', 'asset', upper(substr(md5(random()::text), 1, 12))),
    (gen_random_uuid(), '1020', 'Loans Receivable', 'asset', upper(substr(md5(random()::text), 1, 12))),
    (gen_random_uuid(), '1030', 'Interest Receivable', 'asset', upper(substr(md5(random()::text), 1, 12))),
    (gen_random_uuid(), '2010', 'Member Savings Deposits', 'liability', upper(substr(md5(random()::text), 1, 12))),
    (gen_random_uuid(), '2020', 'Member Venture Deposits', 'liability', upper(substr(md5(random()::text), 1, 12))),
    (gen_random_uuid(), '2030', 'Member Contributions', 'liability', upper(substr(md5(random()::text), 1, 12))),
    (gen_random_uuid(), '3010', 'Retained Earnings', 'equity', upper(substr(md5(random()::text), 1, 12))),
    (gen_random_uuid(), '3020', 'Share Capital', 'equity', upper(substr(md5(random()::text), 1, 12))),
    (gen_random_uuid(), '4010', 'Interest Income', 'revenue', upper(substr(md5(random()::text), 1, 12))),
    (gen_random_uuid(), '4020', 'Membership Fees', 'revenue', upper(substr(md5(random()::text), 1, 12))),
    (gen_random_uuid(), '5010', 'Operating Expenses', 'expense', upper(substr(md5(random()::text), 1, 12))),
    (gen_random_uuid(), '5020', 'Bank Charges', 'expense', upper(substr(md5(random()::text), 1, 12)))
ON CONFLICT (code) DO NOTHING;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS bulk_transaction_logs CASCADE;
DROP TABLE IF EXISTS guarantee_requests CASCADE;
DROP TABLE IF EXISTS loan_applications CASCADE;
DROP TABLE IF EXISTS guarantor_profiles CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS journals CASCADE;
DROP TABLE IF EXISTS template_lines CASCADE;
DROP TABLE IF EXISTS transaction_templates CASCADE;
DROP TABLE IF EXISTS gl_accounts CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS member_fees CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS product_types CASCADE;
DROP TABLE IF EXISTS members CASCADE;

DROP FUNCTION IF EXISTS set_updated_at CASCADE;

DROP TYPE IF EXISTS guarantee_status;
DROP TYPE IF EXISTS repayment_frequency;
DROP TYPE IF EXISTS calculation_mode;
DROP TYPE IF EXISTS application_status;
DROP TYPE IF EXISTS repayment_type;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS transaction_status;
DROP TYPE IF EXISTS transaction_kind;
DROP TYPE IF EXISTS gl_account_type;
DROP TYPE IF EXISTS fee_classification;
DROP TYPE IF EXISTS product_kind;
";
