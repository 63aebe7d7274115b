use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RateLimits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RateLimits::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(RateLimits::DeviceFingerprint).string().not_null())
                    .col(ColumnDef::new(RateLimits::OutletId).string().not_null())
                    .col(ColumnDef::new(RateLimits::QrCodeId).string().null())
                    .col(ColumnDef::new(RateLimits::ActionType).string().not_null())
                    .col(
                        ColumnDef::new(RateLimits::ActionCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(RateLimits::LastActionAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One ledger row per key tuple, a missing QR code included.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_rate_limits_key \
                 ON rate_limits (device_fingerprint, outlet_id, qr_code_id, action_type) \
                 NULLS NOT DISTINCT",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Incentives::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Incentives::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Incentives::MerchantId).string().not_null())
                    .col(ColumnDef::new(Incentives::Title).string().not_null())
                    .col(ColumnDef::new(Incentives::Description).text().null())
                    .col(ColumnDef::new(Incentives::CodePrefix).string().null())
                    .col(
                        ColumnDef::new(Incentives::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Incentives::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_incentives_merchant_active")
                    .table(Incentives::Table)
                    .col(Incentives::MerchantId)
                    .col(Incentives::IsActive)
                    .col(Incentives::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReviewSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReviewSessions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReviewSessions::QrCodeId).string().not_null())
                    .col(ColumnDef::new(ReviewSessions::OutletId).string().not_null())
                    .col(ColumnDef::new(ReviewSessions::MerchantId).string().not_null())
                    .col(
                        ColumnDef::new(ReviewSessions::DeviceFingerprint)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewSessions::SessionLanguage)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReviewSessions::ReviewText).text().null())
                    .col(
                        ColumnDef::new(ReviewSessions::ReviewPosted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ReviewSessions::IncentiveId).uuid().null())
                    .col(
                        ColumnDef::new(ReviewSessions::IncentiveClaimed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ReviewSessions::IncentiveCode).string().null())
                    .col(
                        ColumnDef::new(ReviewSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewSessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut incentive_foreign_key())
                    .to_owned(),
            )
            .await?;

        // Claimed rows must carry both the incentive and its code.
        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE review_sessions ADD CONSTRAINT chk_review_sessions_claim \
                 CHECK (incentive_claimed = (incentive_id IS NOT NULL AND incentive_code IS NOT NULL))",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReviewSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Incentives::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RateLimits::Table).to_owned())
            .await
    }
}

/// Incentives that a session has claimed cannot be deleted; deactivate them
/// with `is_active` instead.
fn incentive_foreign_key() -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name("fk_review_sessions_incentive")
        .from(ReviewSessions::Table, ReviewSessions::IncentiveId)
        .to(Incentives::Table, Incentives::Id)
        .on_update(ForeignKeyAction::Cascade)
        .on_delete(ForeignKeyAction::Restrict)
        .to_owned()
}

#[derive(DeriveIden)]
enum RateLimits {
    Table,
    Id,
    DeviceFingerprint,
    OutletId,
    QrCodeId,
    ActionType,
    ActionCount,
    LastActionAt,
}

#[derive(DeriveIden)]
enum Incentives {
    Table,
    Id,
    MerchantId,
    Title,
    Description,
    CodePrefix,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ReviewSessions {
    Table,
    Id,
    QrCodeId,
    OutletId,
    MerchantId,
    DeviceFingerprint,
    SessionLanguage,
    ReviewText,
    ReviewPosted,
    IncentiveId,
    IncentiveClaimed,
    IncentiveCode,
    CreatedAt,
    UpdatedAt,
}
