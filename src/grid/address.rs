use crate::grid::error::LocateGridError;

/// A three-level KMA administrative address, e.g. `충청남도 천안시서북구 부성동`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminAddress<'a> {
    /// 시도
    pub province: &'a str,
    /// 시군구
    pub sub_region: &'a str,
    /// 읍면동
    pub neighborhood: &'a str,
}

impl<'a> AdminAddress<'a> {
    pub fn parse(address: &'a str) -> Result<Self, LocateGridError> {
        let parts: Vec<&str> = address.split_whitespace().collect();
        match parts[..] {
            [province, sub_region, neighborhood] => Ok(Self {
                province,
                sub_region,
                neighborhood,
            }),
            _ => Err(LocateGridError::MalformedAddress(address.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_parts() {
        let address = AdminAddress::parse("충청남도  천안시서북구 부성동 ").unwrap();
        assert_eq!(address.province, "충청남도");
        assert_eq!(address.sub_region, "천안시서북구");
        assert_eq!(address.neighborhood, "부성동");
    }

    #[test]
    fn test_wrong_part_count() {
        for bad in ["", "충청남도", "충청남도 천안시서북구", "서울특별시 종로구 청운효자동 1번지"] {
            assert!(
                matches!(AdminAddress::parse(bad), Err(LocateGridError::MalformedAddress(_))),
                "'{bad}' should be rejected"
            );
        }
    }
}
