//! 128 位标识的“分解”编码：拆成高低两个 64 位有符号整数，
//! 存放在 `{most, least}` 子节点中。
use uuid::Uuid;

pub(crate) const MOST_FIELD: &str = "most";
pub(crate) const LEAST_FIELD: &str = "least";

pub(crate) fn split(uuid: Uuid) -> (i64, i64) {
    let value = uuid.as_u128();
    (((value >> 64) as u64) as i64, (value as u64) as i64)
}

pub(crate) fn join(most: i64, least: i64) -> Uuid {
    Uuid::from_u128(((most as u64 as u128) << 64) | (least as u64 as u128))
}
