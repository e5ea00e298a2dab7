use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 指纹/生物识别采集记录
/// - 由外部采集设备写入，本服务只读
/// - 停用时仅置 is_active = false，不物理删除
/// - template_data 可能是 JSON 对象，也可能是被序列化成字符串的 JSON
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "biometric_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub organization_member_id: Option<i64>,
    /// 手指编号，老数据里经常为空
    pub finger_number: Option<i32>,
    pub biometric_type: String,
    pub template_data: Option<Json>,
    pub enrollment_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
