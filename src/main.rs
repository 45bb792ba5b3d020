fn main() {
    productpulse_lib::run()
}
